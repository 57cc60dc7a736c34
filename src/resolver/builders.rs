//! Default builders, one per component kind.
//!
//! Used whenever a descriptor carries no build block of its own.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::adapter::Adapter;
use crate::cache::InstanceCache;
use crate::constants::{DATASET_CACHE, GATEWAY_CACHE};
use crate::core::{ComponentKey, ComponentKind, Instance, RegistryError, instance};
use crate::registry::RegistryEntry;

use super::context::BuildContext;

/// What a mapper without an adapter resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapperDefinition {
    /// Mapper identifier
    pub id: String,
    /// Relation the mapper was registered for
    pub relation_id: Option<String>,
    /// Options copied from the mapper's configuration
    #[serde(default)]
    pub options: BTreeMap<String, serde_json::Value>,
}

pub(crate) fn build_default(ctx: &BuildContext<'_>) -> Result<Instance, RegistryError> {
    match ctx.kind() {
        ComponentKind::Gateway => build_gateway(ctx),
        ComponentKind::Dataset => build_dataset(ctx),
        ComponentKind::Schema | ComponentKind::Relation | ComponentKind::Command => {
            build_with_adapter(ctx)
        }
        ComponentKind::Mapper => build_mapper(ctx),
    }
}

fn build_gateway(ctx: &BuildContext<'_>) -> Result<Instance, RegistryError> {
    let adapter = ctx.adapter()?.ok_or_else(|| RegistryError::AdapterNotFound {
        adapter: "<none>".to_string(),
        component: ctx.path().to_string(),
    })?;

    ctx.cache()
        .namespaced(GATEWAY_CACHE)
        .namespaced(adapter.name())
        .try_fetch_or_store(ctx.id().to_string(), || adapter.gateway(ctx.config()))
        .map_err(|source| RegistryError::BuildFailed {
            component: ctx.path().to_string(),
            source,
        })
}

fn build_dataset(ctx: &BuildContext<'_>) -> Result<Instance, RegistryError> {
    let Some(gateway_id) = ctx.registered_gateway() else {
        return Err(RegistryError::NoBuilder {
            component: ctx.path().to_string(),
            reason: "no build block and no gateway to create it from".to_string(),
        });
    };
    let adapter = ctx.adapter()?.ok_or_else(|| RegistryError::NoBuilder {
        component: ctx.path().to_string(),
        reason: format!("gateway '{gateway_id}' was built without an adapter"),
    })?;

    let key = ComponentKey::new(ComponentKind::Gateway, gateway_id);
    let gateway = ctx.lookup(&key.path()).ok_or_else(|| RegistryError::NotFound {
        path: key.path(),
    })?;

    create_dataset(ctx.cache(), adapter, gateway_id, gateway, ctx.id())
}

fn build_with_adapter(ctx: &BuildContext<'_>) -> Result<Instance, RegistryError> {
    let kind = ctx.kind();
    let Some(adapter) = ctx.adapter()? else {
        return Err(RegistryError::NoBuilder {
            component: ctx.path().to_string(),
            reason: "no build block and no adapter named or inherited".to_string(),
        });
    };
    if !adapter.supports(kind) {
        return Err(RegistryError::NoBuilder {
            component: ctx.path().to_string(),
            reason: format!("adapter '{}' cannot build {}", adapter.name(), kind.plural()),
        });
    }

    let built = match kind {
        ComponentKind::Schema => adapter.schema(ctx),
        ComponentKind::Relation => adapter.relation(ctx),
        _ => adapter.command(ctx),
    };
    built.map_err(|source| RegistryError::BuildFailed {
        component: ctx.path().to_string(),
        source,
    })
}

fn build_mapper(ctx: &BuildContext<'_>) -> Result<Instance, RegistryError> {
    if let Some(adapter) = ctx.adapter()? {
        if adapter.supports(ComponentKind::Mapper) {
            return adapter.mapper(ctx).map_err(|source| RegistryError::BuildFailed {
                component: ctx.path().to_string(),
                source,
            });
        }
    }

    Ok(instance(MapperDefinition {
        id: ctx.id().to_string(),
        relation_id: ctx.config().relation_id.as_ref().map(|r| r.id().to_string()),
        options: ctx.config().options.clone(),
    }))
}

/// Create (or fetch) the dataset `name` through a registered gateway.
pub(crate) fn dataset_via_gateway(
    cache: &Arc<InstanceCache>,
    adapter: &Arc<dyn Adapter>,
    gateway: &RegistryEntry,
    name: &str,
) -> Result<Instance, RegistryError> {
    create_dataset(cache, adapter, &gateway.key().id, gateway.instance(), name)
}

fn create_dataset(
    cache: &Arc<InstanceCache>,
    adapter: &Arc<dyn Adapter>,
    gateway_id: &str,
    gateway: &Instance,
    name: &str,
) -> Result<Instance, RegistryError> {
    cache
        .namespaced(DATASET_CACHE)
        .namespaced(adapter.name())
        .namespaced(gateway_id)
        .try_fetch_or_store(name.to_string(), || adapter.dataset(gateway, name))
        .map_err(|source| RegistryError::BuildFailed {
            component: ComponentKey::new(ComponentKind::Dataset, name).path(),
            source,
        })
}
