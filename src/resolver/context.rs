//! What a build procedure sees of the registry being built.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapter::{Adapter, AdapterSet};
use crate::cache::InstanceCache;
use crate::core::{ComponentKey, ComponentKind, Instance, RegistryError};
use crate::declaration::{ComponentConfig, Reference};
use crate::registry::RegistryEntry;

use super::builders::dataset_via_gateway;

/// Build-time view of one component and its already built dependencies.
///
/// Handed to build blocks and adapter constructors. Every dependency is
/// fetched from components registered earlier in the pass, never from
/// pending declarations.
pub struct BuildContext<'a> {
    key: &'a ComponentKey,
    path: String,
    config: &'a ComponentConfig,
    entries: &'a BTreeMap<String, RegistryEntry>,
    cache: &'a Arc<InstanceCache>,
    adapters: &'a AdapterSet,
}

impl<'a> BuildContext<'a> {
    pub(crate) fn new(
        key: &'a ComponentKey,
        config: &'a ComponentConfig,
        entries: &'a BTreeMap<String, RegistryEntry>,
        cache: &'a Arc<InstanceCache>,
        adapters: &'a AdapterSet,
    ) -> Self {
        Self {
            key,
            path: key.path(),
            config,
            entries,
            cache,
            adapters,
        }
    }

    /// Key of the component being built.
    pub fn key(&self) -> &ComponentKey {
        self.key
    }

    /// Registry path of the component being built.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Identifier of the component being built.
    pub fn id(&self) -> &str {
        &self.config.id
    }

    /// Kind of the component being built.
    pub fn kind(&self) -> ComponentKind {
        self.key.kind
    }

    /// Configuration of the component being built.
    pub fn config(&self) -> &ComponentConfig {
        self.config
    }

    /// Adapter specific option.
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.config.options.get(key)
    }

    /// Instance registered at `path`, if it was built earlier in the pass.
    pub fn lookup(&self, path: &str) -> Option<&Instance> {
        self.entries.get(path).map(RegistryEntry::instance)
    }

    /// The shared cache of the pass.
    pub fn cache(&self) -> &Arc<InstanceCache> {
        self.cache
    }

    /// The referenced gateway.
    pub fn gateway(&self) -> Option<&Instance> {
        self.reference_entry(ComponentKind::Gateway, self.config.gateway.as_ref())
            .map(RegistryEntry::instance)
    }

    /// The referenced schema.
    pub fn schema(&self) -> Option<&Instance> {
        self.reference_entry(ComponentKind::Schema, self.config.schema.as_ref())
            .map(RegistryEntry::instance)
    }

    /// The referenced relation.
    pub fn relation(&self) -> Option<&Instance> {
        self.reference_entry(ComponentKind::Relation, self.config.relation_id.as_ref())
            .map(RegistryEntry::instance)
    }

    /// The referenced dataset.
    ///
    /// A registered dataset wins. Otherwise the dataset is created through
    /// the referenced gateway's adapter and memoized in the shared cache, so
    /// every component naming the same gateway and dataset shares one
    /// instance. Returns `Ok(None)` when there is no dataset reference, no
    /// registered gateway, or a gateway built without an adapter.
    pub fn dataset(&self) -> Result<Option<Instance>, RegistryError> {
        let Some(dataset) = self.config.dataset.as_ref() else {
            return Ok(None);
        };
        if let Some(entry) = self.reference_entry(ComponentKind::Dataset, Some(dataset)) {
            return Ok(Some(Arc::clone(entry.instance())));
        }

        let Some(gateway) = self.reference_entry(ComponentKind::Gateway, self.config.gateway.as_ref())
        else {
            return Ok(None);
        };
        let Some(adapter_name) = gateway.adapter() else {
            return Ok(None);
        };
        let adapter = self.adapters.get(adapter_name).ok_or_else(|| {
            RegistryError::AdapterNotFound {
                adapter: adapter_name.to_string(),
                component: gateway.key().path(),
            }
        })?;

        dataset_via_gateway(self.cache, adapter, gateway, dataset.id()).map(Some)
    }

    /// Name of the adapter used for this component.
    ///
    /// The component's own `adapter`, else the adapter its gateway, relation
    /// or dataset was built with, in that order.
    pub fn adapter_name(&self) -> Option<&str> {
        if let Some(adapter) = self.config.adapter.as_deref() {
            return Some(adapter);
        }

        [
            (ComponentKind::Gateway, self.config.gateway.as_ref()),
            (ComponentKind::Relation, self.config.relation_id.as_ref()),
            (ComponentKind::Dataset, self.config.dataset.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, reference)| self.reference_entry(kind, reference))
        .find_map(RegistryEntry::adapter)
    }

    /// The adapter used for this component, if one is named or inherited.
    ///
    /// Fails with [`RegistryError::AdapterNotFound`] when the name is not
    /// registered.
    pub fn adapter(&self) -> Result<Option<&'a Arc<dyn Adapter>>, RegistryError> {
        let Some(name) = self.adapter_name() else {
            return Ok(None);
        };
        let adapters: &'a AdapterSet = self.adapters;
        adapters.get(name).map(Some).ok_or_else(|| RegistryError::AdapterNotFound {
            adapter: name.to_string(),
            component: self.path.clone(),
        })
    }

    /// Identifier of the referenced gateway when it is registered.
    pub(crate) fn registered_gateway(&self) -> Option<&str> {
        self.reference_entry(ComponentKind::Gateway, self.config.gateway.as_ref())
            .map(|entry| entry.key().id.as_str())
    }

    fn reference_entry(
        &self,
        kind: ComponentKind,
        reference: Option<&Reference>,
    ) -> Option<&'a RegistryEntry> {
        let reference = reference?;
        let entries: &'a BTreeMap<String, RegistryEntry> = self.entries;
        entries.get(&ComponentKey::new(kind, reference.id()).path())
    }
}
