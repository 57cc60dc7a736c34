//! In-memory adapter.
//!
//! Builds plain structs holding the instances they were built from, so tests
//! can check which gateway, dataset or schema a component received.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::adapter::Adapter;
use crate::core::{ComponentKind, Instance, instance};
use crate::declaration::ComponentConfig;
use crate::resolver::BuildContext;

/// An opened in-memory gateway.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryGateway {
    /// Gateway id
    pub id: String,
    /// Options of the gateway declaration
    pub options: BTreeMap<String, serde_json::Value>,
}

/// A dataset created through a [`MemoryGateway`].
#[derive(Debug)]
pub struct MemoryDataset {
    /// Dataset name
    pub name: String,
    /// The gateway it was created from
    pub gateway: Instance,
}

/// A schema built by the memory adapter.
#[derive(Debug)]
pub struct MemorySchema {
    /// Schema id
    pub id: String,
    /// Attribute names from the `attributes` option
    pub attributes: Vec<String>,
    /// The dataset the schema describes, if any
    pub dataset: Option<Instance>,
}

/// A relation built by the memory adapter.
#[derive(Debug)]
pub struct MemoryRelation {
    /// Relation id
    pub id: String,
    /// Resolved dataset
    pub dataset: Option<Instance>,
    /// Resolved schema
    pub schema: Option<Instance>,
}

/// A command built by the memory adapter.
#[derive(Debug)]
pub struct MemoryCommand {
    /// Command id
    pub id: String,
    /// The relation the command writes to
    pub relation: Option<Instance>,
}

/// Adapter building the `Memory*` types. Clones share their counters.
#[derive(Clone)]
pub struct MemoryAdapter {
    name: String,
    gateways_opened: Arc<AtomicUsize>,
    datasets_created: Arc<AtomicUsize>,
}

impl MemoryAdapter {
    /// Adapter registered as `memory`.
    pub fn new() -> Self {
        Self::named("memory")
    }

    /// Adapter registered under another name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gateways_opened: Arc::new(AtomicUsize::new(0)),
            datasets_created: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How many gateways were opened.
    pub fn gateways_opened(&self) -> usize {
        self.gateways_opened.load(Ordering::SeqCst)
    }

    /// How many datasets were created.
    pub fn datasets_created(&self) -> usize {
        self.datasets_created.load(Ordering::SeqCst)
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MemoryAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryAdapter")
            .field("name", &self.name)
            .field("gateways_opened", &self.gateways_opened())
            .field("datasets_created", &self.datasets_created())
            .finish()
    }
}

impl Adapter for MemoryAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn supports(&self, kind: ComponentKind) -> bool {
        kind != ComponentKind::Mapper
    }

    fn gateway(&self, config: &ComponentConfig) -> Result<Instance> {
        self.gateways_opened.fetch_add(1, Ordering::SeqCst);
        Ok(instance(MemoryGateway {
            id: config.id.clone(),
            options: config.options.clone(),
        }))
    }

    fn dataset(&self, gateway: &Instance, name: &str) -> Result<Instance> {
        self.datasets_created.fetch_add(1, Ordering::SeqCst);
        Ok(instance(MemoryDataset {
            name: name.to_string(),
            gateway: Arc::clone(gateway),
        }))
    }

    fn schema(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        let attributes = ctx
            .option("attributes")
            .and_then(serde_json::Value::as_array)
            .map(|values| values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        Ok(instance(MemorySchema {
            id: ctx.id().to_string(),
            attributes,
            dataset: ctx.dataset()?,
        }))
    }

    fn relation(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        Ok(instance(MemoryRelation {
            id: ctx.id().to_string(),
            dataset: ctx.dataset()?,
            schema: ctx.schema().cloned(),
        }))
    }

    fn command(&self, ctx: &BuildContext<'_>) -> Result<Instance> {
        Ok(instance(MemoryCommand {
            id: ctx.id().to_string(),
            relation: ctx.relation().cloned(),
        }))
    }
}
