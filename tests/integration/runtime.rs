//! Building a runtime: gateways, datasets, schemas, relations, commands and
//! mappers wired together through the registry.

use std::sync::Arc;
use std::thread;

use ormkit_registry::adapter::AdapterSet;
use ormkit_registry::cache::InstanceCache;
use ormkit_registry::core::{RegistryError, instance, same_instance};
use ormkit_registry::declaration::Declarations;
use ormkit_registry::resolver::{MapperDefinition, Resolver};
use ormkit_registry::test_utils::{
    MemoryAdapter, MemoryCommand, MemoryDataset, MemoryGateway, MemoryRelation, MemorySchema,
};

use crate::common::memory_adapters;

#[test]
fn test_dataset_without_gateway_uses_build_block() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.dataset("users").build_with(|_| Ok(instance(vec!["Jane".to_string()])));

    let registry = Resolver::new(decls, adapters).resolve().unwrap();
    let users = registry.get::<Vec<String>>("datasets.users").unwrap();
    assert_eq!(*users, vec!["Jane".to_string()]);
}

#[test]
fn test_gateway_is_shared_by_datasets() {
    let (adapter, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory").option("url", serde_json::json!("memory://"));
    decls.dataset("users").gateway("default");
    decls.dataset("tasks").gateway("default");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let gateway = registry.lookup("gateways.default").unwrap();
    let users = registry.get::<MemoryDataset>("datasets.users").unwrap();
    let tasks = registry.get::<MemoryDataset>("datasets.tasks").unwrap();

    assert_eq!(users.name, "users");
    assert!(same_instance(&users.gateway, gateway));
    assert!(same_instance(&tasks.gateway, gateway));
    assert_eq!(adapter.gateways_opened(), 1);
    assert_eq!(adapter.datasets_created(), 2);

    let gateway = registry.get::<MemoryGateway>("gateways.default").unwrap();
    assert_eq!(gateway.options.get("url"), Some(&serde_json::json!("memory://")));
}

#[test]
fn test_inline_schema_is_registered_on_its_own() {
    let (adapter, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls
        .relation("people")
        .inline_schema("users")
        .option("attributes", serde_json::json!(["id", "name"]));

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let schema_instance = registry.lookup("schemas.users").unwrap();
    let relation = registry.get::<MemoryRelation>("relations.people").unwrap();
    let schema = registry.get::<MemorySchema>("schemas.users").unwrap();

    assert_eq!(relation.id, "people");
    assert!(same_instance(relation.schema.as_ref().unwrap(), schema_instance));
    assert_eq!(schema.attributes, vec!["id", "name"]);

    // Schema and relation share the dataset named after the schema
    let relation_dataset = relation.dataset.as_ref().unwrap();
    assert!(same_instance(relation_dataset, schema.dataset.as_ref().unwrap()));
    assert_eq!(relation_dataset.downcast_ref::<MemoryDataset>().unwrap().name, "users");
    assert_eq!(adapter.datasets_created(), 1);
}

#[test]
fn test_relation_gets_registered_dataset_and_schema() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.relation("users");
    decls.schema("users");
    decls.dataset("users").gateway("default");
    decls.gateway("default").adapter("memory");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let relation = registry.get::<MemoryRelation>("relations.users").unwrap();
    assert!(same_instance(
        relation.dataset.as_ref().unwrap(),
        registry.lookup("datasets.users").unwrap()
    ));
    assert!(same_instance(
        relation.schema.as_ref().unwrap(),
        registry.lookup("schemas.users").unwrap()
    ));
}

#[test]
fn test_commands_receive_their_relation() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls.relation("users");
    decls.commands("users").define("create").define("delete");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let create = registry.get::<MemoryCommand>("commands.users.create").unwrap();
    assert_eq!(create.id, "create");
    assert!(same_instance(
        create.relation.as_ref().unwrap(),
        registry.lookup("relations.users").unwrap()
    ));
    assert!(registry.contains("commands.users.delete"));
    assert!(!registry.contains("commands.create"));
}

#[test]
fn test_command_for_undeclared_relation_fails() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.commands("users").adapter("memory").define("create");

    let err = Resolver::new(decls, adapters).resolve().unwrap_err();
    assert!(matches!(err, RegistryError::MissingDependency { ref id, .. } if id == "users"));
}

#[test]
fn test_mapper_falls_back_to_definition() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls.relation("users");
    decls.mappers("users").define("entity");
    decls.mappers("archived").define("entity");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let mapper = registry.get::<MapperDefinition>("mappers.users.entity").unwrap();
    assert_eq!(mapper.relation_id.as_deref(), Some("users"));
    let orphan = registry.get::<MapperDefinition>("mappers.archived.entity").unwrap();
    assert_eq!(orphan.relation_id.as_deref(), Some("archived"));
}

#[test]
fn test_unregistered_adapter() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("sql");

    let err = Resolver::new(decls, adapters).resolve().unwrap_err();
    match err {
        RegistryError::AdapterNotFound {
            adapter,
            component,
        } => {
            assert_eq!(adapter, "sql");
            assert_eq!(component, "gateways.default");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_relation_without_adapter_has_no_builder() {
    let (_, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.relation("users");

    let err = Resolver::new(decls, adapters).resolve().unwrap_err();
    assert!(matches!(err, RegistryError::NoBuilder { ref component, .. } if component == "relations.users"));
}

#[test]
fn test_lazy_dataset_matches_build_time_dataset() {
    let (adapter, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");
    decls.relation("users");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();
    let relation = registry.get::<MemoryRelation>("relations.users").unwrap();

    let dataset = registry.dataset("default", "users").unwrap();
    assert!(same_instance(&dataset, relation.dataset.as_ref().unwrap()));

    let tasks = registry.dataset("default", "tasks").unwrap();
    let again = registry.dataset("default", "tasks").unwrap();
    assert!(same_instance(&tasks, &again));
    assert_eq!(adapter.datasets_created(), 2);
}

#[test]
fn test_lazy_dataset_from_many_threads() {
    let (adapter, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("default").adapter("memory");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let datasets: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.dataset("default", "events").unwrap()))
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert!(datasets.iter().all(|dataset| same_instance(dataset, &datasets[0])));
    assert_eq!(adapter.datasets_created(), 1);
}

#[test]
fn test_shared_cache_reuses_gateways_across_registries() {
    let (adapter, adapters) = memory_adapters();
    let cache = Arc::new(InstanceCache::new());

    let declare = || {
        let mut decls = Declarations::new();
        decls.gateway("default").adapter("memory");
        decls
    };

    let first = Resolver::new(declare(), adapters.clone())
        .with_cache(Arc::clone(&cache))
        .resolve()
        .unwrap();
    let second = Resolver::new(declare(), adapters).with_cache(Arc::clone(&cache)).resolve().unwrap();

    assert!(same_instance(
        first.lookup("gateways.default").unwrap(),
        second.lookup("gateways.default").unwrap()
    ));
    assert_eq!(adapter.gateways_opened(), 1);
    assert!(Arc::ptr_eq(first.cache(), &cache));
}

#[test]
fn test_shared_cache_keeps_gateways_of_other_adapters_apart() {
    let (memory, memory_set) = memory_adapters();
    let archive = MemoryAdapter::named("archive");
    let cache = Arc::new(InstanceCache::new());

    let declare = |adapter: &str| {
        let mut decls = Declarations::new();
        decls.gateway("default").adapter(adapter);
        decls
    };

    let first = Resolver::new(declare("memory"), memory_set)
        .with_cache(Arc::clone(&cache))
        .resolve()
        .unwrap();
    let second = Resolver::new(declare("archive"), AdapterSet::new().with(archive.clone()))
        .with_cache(Arc::clone(&cache))
        .resolve()
        .unwrap();

    assert!(!same_instance(
        first.lookup("gateways.default").unwrap(),
        second.lookup("gateways.default").unwrap()
    ));
    assert_eq!(memory.gateways_opened(), 1);
    assert_eq!(archive.gateways_opened(), 1);
}

#[test]
fn test_datasets_of_dotted_gateways_stay_apart() {
    let (adapter, adapters) = memory_adapters();
    let mut decls = Declarations::new();
    decls.gateway("a").adapter("memory");
    decls.gateway("a.b").adapter("memory");

    let registry = Resolver::new(decls, adapters).resolve().unwrap();

    let nested = registry.dataset("a", "b.c").unwrap();
    let flat = registry.dataset("a.b", "c").unwrap();
    assert!(!same_instance(&nested, &flat));
    assert_eq!(flat.downcast_ref::<MemoryDataset>().unwrap().name, "c");
    assert_eq!(adapter.datasets_created(), 2);
}
