//! Build order and resolution failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ormkit_registry::core::{RegistryError, instance, user_friendly_error};
use ormkit_registry::declaration::{Declarations, RelationshipKind};
use ormkit_registry::resolver::Resolver;

use crate::common::memory_adapters;

/// Declarations whose build blocks record the order they ran in.
fn recording(log: &Arc<Mutex<Vec<String>>>, decls: &mut Declarations, path: &str) {
    let log = Arc::clone(log);
    let path = path.to_string();
    let (kind, id) = path.split_once('.').unwrap();
    let descriptor = match kind {
        "gateways" => decls.gateway(id),
        "datasets" => decls.dataset(id),
        "schemas" => decls.schema(id),
        _ => decls.relation(id),
    };
    descriptor.build_with(move |_| {
        log.lock().unwrap().push(path);
        Ok(instance(()))
    });
}

#[test]
fn test_declaration_order_does_not_matter() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut decls = Declarations::new();
    recording(&log, &mut decls, "relations.users");
    recording(&log, &mut decls, "schemas.users");
    recording(&log, &mut decls, "datasets.users");
    recording(&log, &mut decls, "gateways.default");

    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    assert_eq!(registry.len(), 4);
    assert_eq!(
        *log.lock().unwrap(),
        vec!["gateways.default", "datasets.users", "schemas.users", "relations.users"]
    );
}

#[test]
fn test_same_tier_keeps_declaration_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut decls = Declarations::new();
    recording(&log, &mut decls, "datasets.tasks");
    recording(&log, &mut decls, "datasets.users");
    recording(&log, &mut decls, "datasets.posts");

    let (_, adapters) = memory_adapters();
    Resolver::new(decls, adapters).resolve().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["datasets.tasks", "datasets.users", "datasets.posts"]);
}

#[test]
fn test_relation_referencing_relation_is_built_after_it() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let mut decls = Declarations::new();
    {
        let log = Arc::clone(&log);
        decls.relation("active_users").relation_id("users").build_with(move |ctx| {
            assert!(ctx.relation().is_some());
            log.lock().unwrap().push("relations.active_users".to_string());
            Ok(instance(()))
        });
    }
    recording(&log, &mut decls, "relations.users");

    let (_, adapters) = memory_adapters();
    Resolver::new(decls, adapters).resolve().unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["relations.users", "relations.active_users"]);
}

#[test]
fn test_redeclaration_replaces_pending_descriptor() {
    let mut decls = Declarations::new();
    decls.dataset("users").build_with(|_| Ok(instance("first")));
    decls.dataset("users").build_with(|_| Ok(instance("second")));

    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(decls, adapters).resolve().unwrap();
    assert_eq!(*registry.get::<&str>("datasets.users").unwrap(), "second");
}

#[test]
fn test_cycle_through_three_relations() {
    let mut decls = Declarations::new();
    for (id, target) in [("a", "b"), ("b", "c"), ("c", "a")] {
        decls.relation(id).relation_id(target).build_with(|_| Ok(instance(())));
    }

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();
    match &err {
        RegistryError::CyclicDependency {
            chain,
        } => {
            assert_eq!(chain, "relations.a → relations.b → relations.c → relations.a");
        }
        other => panic!("unexpected error: {other}"),
    }

    let ctx = user_friendly_error(err.into());
    assert!(ctx.suggestion.unwrap().contains("Break the cycle"));
}

#[test]
fn test_self_reference_is_a_cycle() {
    let mut decls = Declarations::new();
    decls.relation("tree").relation_id("tree").build_with(|_| Ok(instance(())));

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();
    assert!(matches!(err, RegistryError::CyclicDependency { .. }));
}

#[test]
fn test_missing_dependency_aborts_before_building() {
    let built = Arc::new(Mutex::new(false));
    let mut decls = Declarations::new();
    {
        let built = Arc::clone(&built);
        decls.gateway("default").build_with(move |_| {
            *built.lock().unwrap() = true;
            Ok(instance(()))
        });
    }
    decls.schema("users").dataset("people").build_with(|_| Ok(instance(())));

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();

    assert_eq!(
        err.to_string(),
        "Component 'schemas.users' references dataset 'people' which was never declared"
    );
    assert!(!*built.lock().unwrap());
}

#[test]
fn test_build_error_keeps_its_cause() {
    let mut decls = Declarations::new();
    decls.gateway("default").build_with(|_| anyhow::bail!("connection refused"));

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();

    assert_eq!(err.to_string(), "Failed to build 'gateways.default'");
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "connection refused");
}

/// A dataset whose build block counts its runs.
fn counted_dataset(decls: &mut Declarations) -> Arc<AtomicUsize> {
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&runs);
    decls.dataset("users").build_with(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(instance(()))
    });
    runs
}

#[test]
fn test_relationship_to_undeclared_relation_aborts_before_building() {
    let mut decls = Declarations::new();
    let runs = counted_dataset(&mut decls);
    decls
        .relation("users")
        .relationship("tasks", "tasks", RelationshipKind::OneToMany)
        .build_with(|_| Ok(instance(())));

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();

    assert_eq!(
        err.to_string(),
        "Component 'relations.users' references relation 'tasks' which was never declared"
    );
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_duplicate_connector_aborts_before_building() {
    let mut decls = Declarations::new();
    let runs = counted_dataset(&mut decls);
    decls
        .relation("users")
        .relationship("tasks", "tasks", RelationshipKind::OneToMany)
        .relationship("tasks", "tasks", RelationshipKind::ManyToMany)
        .build_with(|_| Ok(instance(())));
    decls.relation("tasks").build_with(|_| Ok(instance(())));

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateConnector { .. }));
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_commands_rendering_one_path_are_rejected() {
    let mut decls = Declarations::new();
    let runs = counted_dataset(&mut decls);
    decls.relation("a").build_with(|_| Ok(instance(())));
    decls.relation("a.b").build_with(|_| Ok(instance(())));
    decls.commands("a").define_with("b.c", |_| Ok(instance("first")));
    decls.commands("a.b").define_with("c", |_| Ok(instance("second")));

    let (_, adapters) = memory_adapters();
    let err = Resolver::new(decls, adapters).resolve().unwrap_err();

    assert!(matches!(err, RegistryError::PathConflict { ref path, .. } if path == "commands.a.b.c"));
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    let ctx = user_friendly_error(err.into());
    assert!(ctx.suggestion.unwrap().contains("Avoid '.'"));
}
