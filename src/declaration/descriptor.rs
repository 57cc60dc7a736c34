//! Component descriptors: the declarative record of one buildable unit.
//!
//! A [`ComponentDescriptor`] is created during the declaration phase and
//! consumed by the resolver. It never holds object references to other
//! components, only [`Reference`]s by identifier, because the referenced
//! component may not be built (or even declared) yet.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use crate::constants::DEFAULT_GATEWAY;
use crate::core::{ComponentKey, ComponentKind, Instance};
use crate::resolver::BuildContext;

/// Build procedure of a component.
///
/// Receives the build context with every dependency already resolved and
/// returns the built instance.
pub type BuildFn = Box<dyn FnOnce(&BuildContext<'_>) -> anyhow::Result<Instance> + Send>;

/// Where a reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceOrigin {
    /// Written by the user; must point at a declared component
    Declared,
    /// Filled in as a default; may point at nothing
    Inferred,
}

/// Symbolic reference to another component by identifier.
///
/// Serializes as the bare identifier. Deserialized references are always
/// [`ReferenceOrigin::Declared`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Reference {
    id: String,
    origin: ReferenceOrigin,
}

impl Reference {
    /// A reference written by the user.
    pub fn declared(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: ReferenceOrigin::Declared,
        }
    }

    /// A reference filled in as a default.
    pub fn inferred(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            origin: ReferenceOrigin::Inferred,
        }
    }

    /// Referenced identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Origin of the reference.
    pub fn origin(&self) -> ReferenceOrigin {
        self.origin
    }

    /// Whether the user wrote this reference.
    pub fn is_declared(&self) -> bool {
        self.origin == ReferenceOrigin::Declared
    }
}

impl Deref for Reference {
    type Target = str;

    fn deref(&self) -> &str {
        &self.id
    }
}

impl From<String> for Reference {
    fn from(id: String) -> Self {
        Self::declared(id)
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.id
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Cardinality of a relationship between two relations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    /// One source row to one target row
    OneToOne,
    /// One source row to many target rows
    #[default]
    OneToMany,
    /// Many source rows to one target row
    ManyToOne,
    /// Many to many, usually through a join relation
    ManyToMany,
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationshipKind::OneToOne => write!(f, "one-to-one"),
            RelationshipKind::OneToMany => write!(f, "one-to-many"),
            RelationshipKind::ManyToOne => write!(f, "many-to-one"),
            RelationshipKind::ManyToMany => write!(f, "many-to-many"),
        }
    }
}

/// A named relationship declared by a relation towards another relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship name, e.g. `tasks`
    pub name: String,
    /// Identifier of the target relation
    pub target: String,
    /// Cardinality
    #[serde(default)]
    pub kind: RelationshipKind,
}

impl Relationship {
    /// Create a relationship.
    pub fn new(name: impl Into<String>, target: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind,
        }
    }
}

/// Configuration mapping of a component.
///
/// `id` is always present. Cross references (`gateway`, `dataset`, `schema`,
/// `relation_id`) are identifiers only. Everything else an adapter may need
/// goes into `options`, which the core never interprets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Component identifier
    #[serde(default)]
    pub id: String,
    /// Adapter name used by the default builders
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter: Option<String>,
    /// Gateway reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Reference>,
    /// Dataset reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<Reference>,
    /// Schema reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Reference>,
    /// Relation reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_id: Option<Reference>,
    /// Relationships towards other relations (relations only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub relationships: Vec<Relationship>,
    /// Adapter specific settings
    #[serde(flatten)]
    pub options: BTreeMap<String, serde_json::Value>,
}

/// Declarative record of one buildable component.
///
/// Setters are chainable and take `&mut self`, so a descriptor can be tuned
/// right where it is declared:
///
/// ```rust
/// use ormkit_registry::declaration::Declarations;
///
/// let mut decls = Declarations::new();
/// decls.gateway("default").adapter("memory");
/// let users = decls.dataset("users").gateway("default");
/// assert_eq!(users.config().gateway.as_deref(), Some("default"));
/// ```
pub struct ComponentDescriptor {
    kind: ComponentKind,
    namespace: Option<String>,
    config: ComponentConfig,
    build: Option<BuildFn>,
    inline_schema: Option<Box<ComponentDescriptor>>,
}

impl ComponentDescriptor {
    /// Create a descriptor with the defaults of its kind filled in.
    ///
    /// - schema: `gateway` and `dataset` inferred as `"default"` and the id
    /// - relation: `dataset` inferred as the id, `gateway` as `"default"`,
    ///   `schema` as the dataset id
    /// - command and mapper: use [`command`](Self::command) and
    ///   [`mapper`](Self::mapper) to get the namespace set
    pub fn new(kind: ComponentKind, id: impl Into<String>) -> Self {
        let id = id.into();
        let mut config = ComponentConfig {
            id: id.clone(),
            ..ComponentConfig::default()
        };

        match kind {
            ComponentKind::Schema => {
                config.gateway = Some(Reference::inferred(DEFAULT_GATEWAY));
                config.dataset = Some(Reference::inferred(id));
            }
            ComponentKind::Relation => {
                config.gateway = Some(Reference::inferred(DEFAULT_GATEWAY));
                config.schema = Some(Reference::inferred(id.clone()));
                config.dataset = Some(Reference::inferred(id));
            }
            ComponentKind::Gateway
            | ComponentKind::Dataset
            | ComponentKind::Command
            | ComponentKind::Mapper => {}
        }

        Self {
            kind,
            namespace: None,
            config,
            build: None,
            inline_schema: None,
        }
    }

    /// Descriptor of a command registered under `relation_id`.
    pub fn command(relation_id: impl Into<String>, id: impl Into<String>) -> Self {
        let relation_id = relation_id.into();
        let mut descriptor = Self::new(ComponentKind::Command, id);
        descriptor.config.relation_id = Some(Reference::declared(relation_id.clone()));
        descriptor.namespace = Some(relation_id);
        descriptor
    }

    /// Descriptor of a mapper registered under `relation_id`.
    ///
    /// The relation reference is inferred: a mapper may be declared for a
    /// relation that does not exist in this registry.
    pub fn mapper(relation_id: impl Into<String>, id: impl Into<String>) -> Self {
        let relation_id = relation_id.into();
        let mut descriptor = Self::new(ComponentKind::Mapper, id);
        descriptor.config.relation_id = Some(Reference::inferred(relation_id.clone()));
        descriptor.namespace = Some(relation_id);
        descriptor
    }

    /// Kind of the component.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Identifier of the component.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Namespace inside the kind, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Registry key of the component.
    pub fn key(&self) -> ComponentKey {
        ComponentKey {
            kind: self.kind,
            namespace: self.namespace.clone(),
            id: self.config.id.clone(),
        }
    }

    /// Configuration mapping.
    pub fn config(&self) -> &ComponentConfig {
        &self.config
    }

    /// Whether a build block was supplied.
    pub fn has_build(&self) -> bool {
        self.build.is_some()
    }

    /// Set the adapter used by the default builder.
    pub fn adapter(&mut self, adapter: impl Into<String>) -> &mut Self {
        self.config.adapter = Some(adapter.into());
        self
    }

    /// Reference a gateway.
    pub fn gateway(&mut self, id: impl Into<String>) -> &mut Self {
        self.config.gateway = Some(Reference::declared(id));
        self
    }

    /// Reference a dataset.
    ///
    /// On a relation whose schema reference is still inferred, the schema
    /// follows the new dataset identity.
    pub fn dataset(&mut self, id: impl Into<String>) -> &mut Self {
        let id = id.into();
        if self.kind == ComponentKind::Relation
            && self.config.schema.as_ref().is_some_and(|schema| !schema.is_declared())
        {
            self.config.schema = Some(Reference::inferred(id.clone()));
        }
        self.config.dataset = Some(Reference::declared(id));
        self
    }

    /// Reference a schema.
    pub fn schema(&mut self, id: impl Into<String>) -> &mut Self {
        self.config.schema = Some(Reference::declared(id));
        self
    }

    /// Reference a relation.
    pub fn relation_id(&mut self, id: impl Into<String>) -> &mut Self {
        self.config.relation_id = Some(Reference::declared(id));
        self
    }

    /// Set an adapter specific option.
    pub fn option(&mut self, key: impl Into<String>, value: serde_json::Value) -> &mut Self {
        self.config.options.insert(key.into(), value);
        self
    }

    /// Declare a relationship towards another relation.
    pub fn relationship(
        &mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        kind: RelationshipKind,
    ) -> &mut Self {
        self.config.relationships.push(Relationship::new(name, target, kind));
        self
    }

    /// Merge a configuration loaded from a setup file.
    ///
    /// Every field set in `config` overrides the descriptor's own, through
    /// the same setters as hand-written declarations. `config.id` is ignored.
    pub fn configure(&mut self, config: ComponentConfig) -> &mut Self {
        let ComponentConfig {
            adapter,
            gateway,
            dataset,
            schema,
            relation_id,
            relationships,
            options,
            ..
        } = config;

        if let Some(adapter) = adapter {
            self.adapter(adapter);
        }
        if let Some(gateway) = gateway {
            self.gateway(String::from(gateway));
        }
        if let Some(dataset) = dataset {
            self.dataset(String::from(dataset));
        }
        if let Some(schema) = schema {
            self.schema(String::from(schema));
        }
        if let Some(relation_id) = relation_id {
            self.relation_id(String::from(relation_id));
        }
        self.config.relationships.extend(relationships);
        self.config.options.extend(options);
        self
    }

    /// Supply the build procedure, replacing the default builder of the kind.
    pub fn build_with<F>(&mut self, build: F) -> &mut Self
    where
        F: FnOnce(&BuildContext<'_>) -> anyhow::Result<Instance> + Send + 'static,
    {
        self.build = Some(Box::new(build));
        self
    }

    /// Declare a schema inline, inside this relation.
    ///
    /// The schema is registered under its own id at `schemas.<id>` and the
    /// relation references it. Unless a dataset was declared explicitly, the
    /// relation's dataset identity becomes the schema id. Returns the nested
    /// schema descriptor for further configuration.
    pub fn inline_schema(&mut self, id: impl Into<String>) -> &mut ComponentDescriptor {
        let id = id.into();
        self.config.schema = Some(Reference::declared(id.clone()));
        if !self.config.dataset.as_ref().is_some_and(Reference::is_declared) {
            self.config.dataset = Some(Reference::inferred(id.clone()));
        }

        let mut schema = ComponentDescriptor::new(ComponentKind::Schema, id);
        schema.config.adapter = self.config.adapter.clone();
        if let Some(gateway) = &self.config.gateway {
            schema.config.gateway = Some(gateway.clone());
        }
        self.inline_schema.insert(Box::new(schema))
    }

    /// Take the inline schema out of this relation, for registration as a
    /// standalone component.
    pub(crate) fn take_inline_schema(&mut self) -> Option<ComponentDescriptor> {
        let mut schema = *self.inline_schema.take()?;
        if schema.config.adapter.is_none() {
            schema.config.adapter = self.config.adapter.clone();
        }
        Some(schema)
    }

    /// Take the build procedure.
    pub(crate) fn take_build(&mut self) -> Option<BuildFn> {
        self.build.take()
    }

    /// Every reference of this component with the kind it points at.
    pub fn references(&self) -> Vec<(ComponentKind, &Reference)> {
        let config = &self.config;
        [
            (ComponentKind::Gateway, config.gateway.as_ref()),
            (ComponentKind::Dataset, config.dataset.as_ref()),
            (ComponentKind::Schema, config.schema.as_ref()),
            (ComponentKind::Relation, config.relation_id.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, reference)| reference.map(|r| (kind, r)))
        .collect()
    }
}

impl fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("key", &self.key())
            .field("config", &self.config)
            .field("build", &self.build.as_ref().map(|_| "<fn>"))
            .field("inline_schema", &self.inline_schema)
            .finish()
    }
}
