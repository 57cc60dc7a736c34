//! Connectors derived between registered relations.

use ormkit_registry::core::{RegistryError, same_instance, user_friendly_error};
use ormkit_registry::declaration::{Declarations, RelationshipKind};
use ormkit_registry::resolver::Resolver;
use ormkit_registry::test_utils::MemoryRelation;

use crate::common::memory_adapters;

fn declarations() -> Declarations {
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls
        .relation("users")
        .relationship("tasks", "tasks", RelationshipKind::OneToMany)
        .relationship("priority_tasks", "tasks", RelationshipKind::OneToMany);
    decls
        .relation("tasks")
        .relationship("owner", "users", RelationshipKind::ManyToOne)
        .relationship("tags", "tags", RelationshipKind::ManyToMany);
    decls.relation("tags");
    decls
}

#[test]
fn test_connectors_link_registered_relations() {
    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(declarations(), adapters).resolve().unwrap();
    let graph = registry.relations();

    assert_eq!(graph.len(), 4);
    assert_eq!(graph.nodes().count(), 3);

    let connector = graph.connector("users_X_tasks__tasks").unwrap();
    assert_eq!(connector.relationship().kind, RelationshipKind::OneToMany);
    assert!(same_instance(
        connector.source().relation(),
        registry.lookup("relations.users").unwrap()
    ));
    let target = connector.target().unwrap();
    assert!(same_instance(target.relation(), registry.lookup("relations.tasks").unwrap()));
    assert_eq!(target.relation().downcast_ref::<MemoryRelation>().unwrap().id, "tasks");
}

#[test]
fn test_both_directions_have_distinct_connectors() {
    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(declarations(), adapters).resolve().unwrap();
    let graph = registry.relations();

    let from_users: Vec<String> = graph.connectors_from("users").iter().map(|c| c.name()).collect();
    assert_eq!(from_users, vec!["users_X_tasks__tasks", "users_X_tasks__priority_tasks"]);

    let from_tasks: Vec<String> = graph.connectors_from("tasks").iter().map(|c| c.name()).collect();
    assert_eq!(from_tasks, vec!["tasks_X_users__owner", "tasks_X_tags__tags"]);

    assert!(graph.connectors_from("tags").is_empty());
}

#[test]
fn test_join_path_between_relations() {
    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(declarations(), adapters).resolve().unwrap();

    let path = registry.relations().find_path("users", "tags").unwrap();
    let names: Vec<String> = path.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["users_X_tasks__tasks", "tasks_X_tags__tags"]);

    assert!(registry.relations().find_path("tags", "users").is_none());
}

#[test]
fn test_duplicate_relationship_name_fails_resolution() {
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls
        .relation("users")
        .relationship("tasks", "tasks", RelationshipKind::OneToMany)
        .relationship("tasks", "tasks", RelationshipKind::OneToOne);
    decls.relation("tasks");

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();

    match &err {
        RegistryError::DuplicateConnector {
            name,
            existing,
            duplicate,
        } => {
            assert_eq!(name, "users_X_tasks__tasks");
            assert_eq!(existing, "users.tasks");
            assert_eq!(duplicate, "users.tasks");
        }
        other => panic!("unexpected error: {other}"),
    }

    let ctx = user_friendly_error(err.into());
    assert!(ctx.suggestion.unwrap().contains("distinct names"));
}

#[test]
fn test_relationship_to_undeclared_relation() {
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls.relation("users").relationship("tasks", "tasks", RelationshipKind::OneToMany);

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();
    assert!(matches!(err, RegistryError::MissingDependency { ref id, .. } if id == "tasks"));
}
