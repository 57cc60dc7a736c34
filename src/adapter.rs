//! Adapter contract for storage backends.
//!
//! Adapters are external collaborators: the registry only calls their
//! constructors through the uniform [`Adapter`] trait and stores whatever
//! opaque [`Instance`] they return. Adapters are looked up by name in an
//! [`AdapterSet`] handed to the resolver.
//!
//! Gateway and dataset construction is mandatory. Schemas, relations,
//! commands and mappers are optional capabilities advertised through
//! [`Adapter::supports`]; a component whose adapter lacks the capability
//! needs its own build block.

use anyhow::{Result, bail};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{ComponentKind, Instance};
use crate::declaration::ComponentConfig;
use crate::resolver::BuildContext;

/// Constructor surface of a storage backend.
pub trait Adapter: Send + Sync {
    /// Adapter name referenced by `adapter = "<name>"` in component configs.
    fn name(&self) -> &str;

    /// Whether this adapter can build components of `kind`.
    fn supports(&self, kind: ComponentKind) -> bool {
        matches!(kind, ComponentKind::Gateway | ComponentKind::Dataset)
    }

    /// Open a gateway.
    fn gateway(&self, config: &ComponentConfig) -> Result<Instance>;

    /// Create the dataset `name` inside `gateway`.
    fn dataset(&self, gateway: &Instance, name: &str) -> Result<Instance>;

    /// Build a schema.
    fn schema(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        bail!("adapter '{}' does not build schemas (requested by '{}')", self.name(), ctx.path())
    }

    /// Build a relation.
    fn relation(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        bail!("adapter '{}' does not build relations (requested by '{}')", self.name(), ctx.path())
    }

    /// Build a command.
    fn command(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        bail!("adapter '{}' does not build commands (requested by '{}')", self.name(), ctx.path())
    }

    /// Build a mapper.
    fn mapper(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        bail!("adapter '{}' does not build mappers (requested by '{}')", self.name(), ctx.path())
    }
}

/// Adapters available to a resolution pass, keyed by name.
#[derive(Clone, Default)]
pub struct AdapterSet {
    adapters: BTreeMap<String, Arc<dyn Adapter>>,
}

impl AdapterSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an adapter, replacing one registered under the same name.
    pub fn register<A: Adapter + 'static>(&mut self, adapter: A) -> &mut Self {
        self.register_shared(Arc::new(adapter))
    }

    /// Add an already shared adapter.
    pub fn register_shared(&mut self, adapter: Arc<dyn Adapter>) -> &mut Self {
        self.adapters.insert(adapter.name().to_string(), adapter);
        self
    }

    /// Builder form of [`register`](Self::register).
    #[must_use]
    pub fn with<A: Adapter + 'static>(mut self, adapter: A) -> Self {
        self.register(adapter);
        self
    }

    /// Adapter registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Adapter>> {
        self.adapters.get(name)
    }

    /// Registered adapter names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }

    /// Number of registered adapters.
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    /// Whether no adapter is registered.
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl fmt::Debug for AdapterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.adapters.keys()).finish()
    }
}
