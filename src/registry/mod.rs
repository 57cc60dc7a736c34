//! The resolved registry: the only object handed to consumers.
//!
//! A [`Registry`] is a flat, immutable mapping from dotted path
//! (`"relations.users"`, `"commands.users.create"`) to the built instance.
//! Paths are matched exactly, there are no wildcards. Lookups never build
//! anything, with one exception: [`Registry::dataset`] creates datasets
//! lazily through a registered gateway, memoized in the shared cache.
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::adapter::AdapterSet;
//! use ormkit_registry::core::{RegistryError, instance};
//! use ormkit_registry::declaration::Declarations;
//! use ormkit_registry::resolver::Resolver;
//!
//! let mut decls = Declarations::new();
//! decls.dataset("users").build_with(|_ctx| Ok(instance(42_u32)));
//! let registry = Resolver::new(decls, AdapterSet::new()).resolve()?;
//!
//! assert!(registry.lookup("datasets.users").is_ok());
//! assert!(matches!(
//!     registry.lookup("datasets.tasks"),
//!     Err(RegistryError::NotFound { .. })
//! ));
//! assert!(matches!(
//!     registry.get::<String>("datasets.users"),
//!     Err(RegistryError::TypeMismatch { .. })
//! ));
//! # Ok::<(), RegistryError>(())
//! ```

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::AdapterSet;
use crate::cache::InstanceCache;
use crate::core::{ComponentKey, ComponentKind, Instance, RegistryError};
use crate::relations::RelationGraph;
use crate::resolver::builders::dataset_via_gateway;

/// One registered component.
#[derive(Clone)]
pub struct RegistryEntry {
    key: ComponentKey,
    instance: Instance,
    adapter: Option<String>,
    gateway: Option<String>,
}

impl RegistryEntry {
    pub(crate) fn new(
        key: ComponentKey,
        instance: Instance,
        adapter: Option<String>,
        gateway: Option<String>,
    ) -> Self {
        Self {
            key,
            instance,
            adapter,
            gateway,
        }
    }

    /// Key of the component.
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    /// The built instance.
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Adapter the component was built with, named or inherited.
    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    /// Registered gateway the component referenced.
    pub fn gateway(&self) -> Option<&str> {
        self.gateway.as_deref()
    }
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("key", &self.key)
            .field("adapter", &self.adapter)
            .field("gateway", &self.gateway)
            .finish_non_exhaustive()
    }
}

/// Resolved components by registry path.
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
    relations: RelationGraph,
    cache: Arc<InstanceCache>,
    adapters: AdapterSet,
}

impl Registry {
    pub(crate) fn new(
        entries: BTreeMap<String, RegistryEntry>,
        relations: RelationGraph,
        cache: Arc<InstanceCache>,
        adapters: AdapterSet,
    ) -> Self {
        Self {
            entries,
            relations,
            cache,
            adapters,
        }
    }

    /// Instance registered at `path`.
    pub fn lookup(&self, path: &str) -> Result<&Instance, RegistryError> {
        self.entry(path).map(RegistryEntry::instance)
    }

    /// Instance registered at `path`, downcast to `T`.
    pub fn get<T: Any + Send + Sync>(&self, path: &str) -> Result<Arc<T>, RegistryError> {
        let instance = Arc::clone(self.lookup(path)?);
        instance.downcast::<T>().map_err(|_| RegistryError::TypeMismatch {
            path: path.to_string(),
            expected: std::any::type_name::<T>().to_string(),
        })
    }

    /// Entry registered at `path`.
    pub fn entry(&self, path: &str) -> Result<&RegistryEntry, RegistryError> {
        self.entries.get(path).ok_or_else(|| RegistryError::NotFound {
            path: path.to_string(),
        })
    }

    /// Whether `path` is registered.
    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Every registered path, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries of one kind, sorted by path.
    pub fn iter_kind(&self, kind: ComponentKind) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values().filter(move |entry| entry.key.kind == kind)
    }

    /// Number of registered components.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Connectors between registered relations.
    pub fn relations(&self) -> &RelationGraph {
        &self.relations
    }

    /// The cache shared with the resolution pass.
    pub fn cache(&self) -> &Arc<InstanceCache> {
        &self.cache
    }

    /// Dataset `name` of `gateway`, created on first use.
    ///
    /// Returns the registered `datasets.<name>` when it was built against the
    /// same gateway. Otherwise the dataset is created through the gateway's
    /// adapter and memoized, so repeated calls (from any thread) yield the
    /// same instance, which is also the one a default-built dataset got
    /// during resolution.
    pub fn dataset(&self, gateway: &str, name: &str) -> Result<Instance, RegistryError> {
        let dataset_path = ComponentKey::new(ComponentKind::Dataset, name).path();
        if let Some(entry) = self.entries.get(&dataset_path) {
            if entry.gateway() == Some(gateway) {
                return Ok(Arc::clone(entry.instance()));
            }
        }

        let gateway_path = ComponentKey::new(ComponentKind::Gateway, gateway).path();
        let gateway_entry = self.entry(&gateway_path)?;
        let Some(adapter_name) = gateway_entry.adapter() else {
            return Err(RegistryError::NoBuilder {
                component: dataset_path,
                reason: format!("gateway '{gateway}' was built without an adapter"),
            });
        };
        let adapter =
            self.adapters.get(adapter_name).ok_or_else(|| RegistryError::AdapterNotFound {
                adapter: adapter_name.to_string(),
                component: gateway_path.clone(),
            })?;

        dataset_via_gateway(&self.cache, adapter, gateway_entry, name)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("paths", &self.entries.keys().collect::<Vec<_>>())
            .field("connectors", &self.relations.len())
            .field("adapters", &self.adapters)
            .finish()
    }
}
