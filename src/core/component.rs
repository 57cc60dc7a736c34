//! Component kinds and keys for the registry
//!
//! Every buildable unit of a data-access runtime belongs to exactly one
//! [`ComponentKind`]. Kinds are ordered into *tiers*: a component may only
//! reference components of an earlier tier, or of its own tier when the
//! resolver can prove the references are acyclic.
//!
//! ```text
//! tier 0  gateways
//! tier 1  datasets
//! tier 2  schemas
//! tier 3  relations
//! tier 4  commands, mappers
//! ```
//!
//! A [`ComponentKey`] identifies one component inside its kind, optionally
//! under a namespace (commands and mappers are namespaced by the relation they
//! belong to). Keys render to the dotted registry paths consumers look up:
//!
//! ```rust
//! use ormkit_registry::core::{ComponentKey, ComponentKind};
//!
//! let key = ComponentKey::namespaced(ComponentKind::Command, "users", "create");
//! assert_eq!(key.path(), "commands.users.create");
//!
//! let key = ComponentKey::new(ComponentKind::Dataset, "users");
//! assert_eq!(key.path(), "datasets.users");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Enumeration of the component kinds a registry can hold
///
/// The set is closed on purpose: resolution ordering is derived from
/// [`ComponentKind::tier`], and every match over kinds stays exhaustive.
///
/// # Serialization
///
/// Kinds serialize as lowercase singular names (`"gateway"`, `"relation"`).
/// Parsing through [`FromStr`](std::str::FromStr) additionally accepts the
/// plural registry form and is case-insensitive.
///
/// ```rust
/// use ormkit_registry::core::ComponentKind;
///
/// let kind: ComponentKind = "Relations".parse().unwrap();
/// assert_eq!(kind, ComponentKind::Relation);
/// assert_eq!(kind.plural(), "relations");
/// assert!("plugin".parse::<ComponentKind>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// Connection handle to a storage backend, shared by datasets
    Gateway,
    /// Raw, schema-less handle to one collection within a gateway
    Dataset,
    /// Named, ordered set of attribute definitions
    Schema,
    /// Dataset combined with a schema; the primary queryable unit
    Relation,
    /// Write operation bound to a relation
    Command,
    /// Output transformation bound to a relation
    Mapper,
}

impl ComponentKind {
    /// All kinds in tier order.
    pub const ALL: [ComponentKind; 6] = [
        ComponentKind::Gateway,
        ComponentKind::Dataset,
        ComponentKind::Schema,
        ComponentKind::Relation,
        ComponentKind::Command,
        ComponentKind::Mapper,
    ];

    /// Plural name used as the first segment of registry paths.
    #[must_use]
    pub fn plural(&self) -> &'static str {
        match self {
            ComponentKind::Gateway => "gateways",
            ComponentKind::Dataset => "datasets",
            ComponentKind::Schema => "schemas",
            ComponentKind::Relation => "relations",
            ComponentKind::Command => "commands",
            ComponentKind::Mapper => "mappers",
        }
    }

    /// Resolution tier of this kind.
    ///
    /// Lower tiers are always built before higher tiers. Commands and mappers
    /// share the last tier since neither depends on the other.
    #[must_use]
    pub fn tier(&self) -> u8 {
        match self {
            ComponentKind::Gateway => 0,
            ComponentKind::Dataset => 1,
            ComponentKind::Schema => 2,
            ComponentKind::Relation => 3,
            ComponentKind::Command | ComponentKind::Mapper => 4,
        }
    }

    /// Whether a component of this kind may reference a component of `other`.
    #[must_use]
    pub fn may_depend_on(&self, other: ComponentKind) -> bool {
        other.tier() <= self.tier()
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentKind::Gateway => write!(f, "gateway"),
            ComponentKind::Dataset => write!(f, "dataset"),
            ComponentKind::Schema => write!(f, "schema"),
            ComponentKind::Relation => write!(f, "relation"),
            ComponentKind::Command => write!(f, "command"),
            ComponentKind::Mapper => write!(f, "mapper"),
        }
    }
}

impl std::str::FromStr for ComponentKind {
    type Err = crate::core::RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gateway" | "gateways" => Ok(ComponentKind::Gateway),
            "dataset" | "datasets" => Ok(ComponentKind::Dataset),
            "schema" | "schemas" => Ok(ComponentKind::Schema),
            "relation" | "relations" => Ok(ComponentKind::Relation),
            "command" | "commands" => Ok(ComponentKind::Command),
            "mapper" | "mappers" => Ok(ComponentKind::Mapper),
            _ => Err(crate::core::RegistryError::UnknownKind {
                kind: s.to_string(),
            }),
        }
    }
}

/// Identity of one component: its kind, optional namespace and id.
///
/// Two declarations with equal keys are the same component; the later one
/// replaces the earlier while still pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentKey {
    /// Component kind
    pub kind: ComponentKind,
    /// Namespace inside the kind (the owning relation for commands and mappers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Identifier, unique within kind and namespace
    pub id: String,
}

impl ComponentKey {
    /// Create a key without a namespace.
    pub fn new(kind: ComponentKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: None,
            id: id.into(),
        }
    }

    /// Create a key under a namespace.
    pub fn namespaced(
        kind: ComponentKind,
        namespace: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            namespace: Some(namespace.into()),
            id: id.into(),
        }
    }

    /// Dotted registry path, `"<plural>.<namespace>.<id>"` or `"<plural>.<id>"`.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}.{}.{}", self.kind.plural(), namespace, self.id),
            None => format!("{}.{}", self.kind.plural(), self.id),
        }
    }
}

impl ComponentKey {
    /// Human readable identity that stays unambiguous when ids contain `.`,
    /// e.g. `command 'b.c' of 'a'`.
    #[must_use]
    pub fn describe(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{} '{}' of '{}'", self.kind, self.id, namespace),
            None => format!("{} '{}'", self.kind, self.id),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
