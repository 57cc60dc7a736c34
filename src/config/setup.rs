//! Setup files: declarations written as TOML.
//!
//! One table per component kind, one sub-table per component. Keys the core
//! does not know end up in the component's `options`:
//!
//! ```toml
//! [naming]
//! namespace = "Persistence"
//!
//! [gateways.default]
//! adapter = "memory"
//!
//! [relations.users]
//! relationships = [{ name = "tasks", target = "tasks", kind = "one-to-many" }]
//!
//! [relations.tasks]
//! table = "todo_items"
//!
//! [commands.users]
//! adapter = "memory"
//! define = ["create", "update"]
//! ```
//!
//! Tables are read in key order, which becomes the declaration order of
//! components within a kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::{ComponentKind, RegistryError};
use crate::declaration::{ComponentConfig, ComponentDescriptor, Declarations};
use crate::naming::{CustomNamespace, NamingStrategy, NoNamespace, WithNamespace};

use super::parse_config;

/// Contents of a setup file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetupFile {
    /// How discovered component files are named
    #[serde(default)]
    pub naming: NamingConfig,
    /// Gateways by id
    #[serde(default)]
    pub gateways: BTreeMap<String, ComponentConfig>,
    /// Datasets by id
    #[serde(default)]
    pub datasets: BTreeMap<String, ComponentConfig>,
    /// Schemas by id
    #[serde(default)]
    pub schemas: BTreeMap<String, ComponentConfig>,
    /// Relations by id
    #[serde(default)]
    pub relations: BTreeMap<String, ComponentConfig>,
    /// Command groups by relation id
    #[serde(default)]
    pub commands: BTreeMap<String, GroupConfig>,
    /// Mapper groups by relation id
    #[serde(default)]
    pub mappers: BTreeMap<String, GroupConfig>,
}

/// Commands or mappers of one relation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Adapter for every member
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    /// Member ids
    #[serde(default)]
    pub define: Vec<String>,
    /// Options shared by every member
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

/// The `[naming]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConfig {
    /// Fixed namespace prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Root directory; directories below it become the namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl NamingConfig {
    /// Strategy described by this table.
    ///
    /// `root` wins over `namespace`; with neither, names carry no namespace.
    pub fn strategy(&self) -> Box<dyn NamingStrategy> {
        match (&self.root, &self.namespace) {
            (Some(root), _) => Box::new(WithNamespace::new(root.clone())),
            (None, Some(namespace)) => Box::new(CustomNamespace::new(namespace.clone())),
            (None, None) => Box::new(NoNamespace),
        }
    }
}

impl SetupFile {
    /// Read and parse a setup file.
    pub fn load(path: &Path) -> Result<Self> {
        parse_config(path)
    }

    /// Parse setup file content.
    pub fn parse(content: &str) -> Result<Self, RegistryError> {
        Ok(toml::from_str(content)?)
    }

    /// Number of components the file declares.
    pub fn component_count(&self) -> usize {
        let groups = |groups: &BTreeMap<String, GroupConfig>| -> usize {
            groups.values().map(|group| group.define.len()).sum()
        };
        self.gateways.len()
            + self.datasets.len()
            + self.schemas.len()
            + self.relations.len()
            + groups(&self.commands)
            + groups(&self.mappers)
    }

    /// Turn the file into pending declarations.
    ///
    /// Fails with [`RegistryError::ConfigError`] when a table's `id` key
    /// disagrees with the table name.
    pub fn into_declarations(self) -> Result<Declarations, RegistryError> {
        let mut decls = Declarations::new();

        let kinds = [
            (ComponentKind::Gateway, self.gateways),
            (ComponentKind::Dataset, self.datasets),
            (ComponentKind::Schema, self.schemas),
            (ComponentKind::Relation, self.relations),
        ];
        for (kind, components) in kinds {
            for (id, config) in components {
                check_id(kind, &id, &config)?;
                decls.declare(ComponentDescriptor::new(kind, id)).configure(config);
            }
        }

        for (relation_id, group) in self.commands {
            declare_group(decls.commands(relation_id), group);
        }
        for (relation_id, group) in self.mappers {
            declare_group(decls.mappers(relation_id), group);
        }

        Ok(decls)
    }
}

fn check_id(kind: ComponentKind, id: &str, config: &ComponentConfig) -> Result<(), RegistryError> {
    if config.id.is_empty() || config.id == id {
        return Ok(());
    }
    Err(RegistryError::ConfigError {
        message: format!(
            "[{}.{}] declares id '{}', which does not match its table name",
            kind.plural(),
            id,
            config.id
        ),
    })
}

fn declare_group(mut group: crate::declaration::ComponentGroup<'_>, config: GroupConfig) {
    if let Some(adapter) = config.adapter {
        group.adapter(adapter);
    }
    for id in config.define {
        group.define(id.clone());
        if let Some(member) = group.member(&id) {
            for (key, value) in &config.options {
                member.option(key.clone(), value.clone());
            }
        }
    }
}
