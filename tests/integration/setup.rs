//! Setup files loaded from disk and resolved.

use std::path::Path;

use ormkit_registry::config::SetupFile;
use ormkit_registry::core::{ComponentKey, ComponentKind, RegistryError};
use ormkit_registry::resolver::{MapperDefinition, Resolver};
use ormkit_registry::test_utils::{MemoryCommand, MemoryRelation};

use crate::common::{FULL_SETUP, SetupProject, memory_adapters};

#[test]
fn test_full_setup_resolves() {
    let project = SetupProject::new(FULL_SETUP);
    let setup = SetupFile::load(&project.setup_path()).unwrap();
    assert_eq!(setup.component_count(), 6);

    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(setup.into_declarations().unwrap(), adapters).resolve().unwrap();

    // Relations inherit the gateway's adapter
    let users = registry.get::<MemoryRelation>("relations.users").unwrap();
    assert_eq!(users.id, "users");
    let entry = registry.entry("relations.users").unwrap();
    assert_eq!(entry.adapter(), Some("memory"));
    assert_eq!(entry.gateway(), Some("default"));

    let create = registry.get::<MemoryCommand>("commands.users.create").unwrap();
    assert_eq!(create.id, "create");

    let mapper = registry.get::<MapperDefinition>("mappers.users.entity").unwrap();
    assert_eq!(mapper.id, "entity");

    let mut connectors: Vec<String> =
        registry.relations().connectors().map(|connector| connector.name()).collect();
    connectors.sort();
    assert_eq!(connectors, vec!["tasks_X_users__owner", "users_X_tasks__tasks"]);
}

#[test]
fn test_full_setup_plan() {
    let setup = SetupFile::parse(FULL_SETUP).unwrap();
    let plan = Resolver::new(setup.into_declarations().unwrap(), memory_adapters().1).plan().unwrap();

    let order: Vec<String> = plan.order.iter().map(ComponentKey::path).collect();
    assert_eq!(
        order,
        vec![
            "gateways.default",
            "datasets.users",
            "relations.tasks",
            "relations.users",
            "commands.users.create",
            "mappers.users.entity",
        ]
    );
    assert_eq!(plan.connectors, vec!["tasks_X_users__owner", "users_X_tasks__tasks"]);
}

#[test]
fn test_naming_table_selects_strategy() {
    let setup = SetupFile::parse(FULL_SETUP).unwrap();
    let strategy = setup.naming.strategy();
    assert_eq!(strategy.component_name(Path::new("relations/users.rb")), "Persistence::Users");
}

#[test]
fn test_group_options_reach_every_member() {
    let setup = SetupFile::parse(
        r#"
        [gateways.default]
        adapter = "memory"

        [relations.users]

        [mappers.users]
        define = ["entity", "summary"]
        struct_name = "User"
        "#,
    )
    .unwrap();

    let (_, adapters) = memory_adapters();
    let registry = Resolver::new(setup.into_declarations().unwrap(), adapters).resolve().unwrap();

    let summary = registry.get::<MapperDefinition>("mappers.users.summary").unwrap();
    assert_eq!(summary.options.get("struct_name"), Some(&serde_json::json!("User")));
    assert_eq!(registry.iter_kind(ComponentKind::Mapper).count(), 2);
}

#[test]
fn test_unknown_section_is_rejected() {
    let err = SetupFile::parse("[repositories.users]\n").unwrap_err();
    assert!(matches!(err, RegistryError::TomlError(_)));
}

#[test]
fn test_missing_setup_file() {
    let project = SetupProject::new("");
    let err = SetupFile::load(&project.dir().join("missing.toml")).unwrap_err();
    assert!(err.to_string().contains("missing.toml"));
}
