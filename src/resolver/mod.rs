//! Dependency resolution: turning declarations into a registry.
//!
//! The resolver consumes every pending [`ComponentDescriptor`] at once, orders
//! them so dependencies are built before dependents, invokes each build
//! procedure exactly once and hands out a [`Registry`].
//!
//! # Resolution Process
//!
//! 1. **Hoisting**: schemas declared inline inside a relation are lifted into
//!    standalone components at `schemas.<id>`. A hoisted schema replaces a
//!    standalone declaration with the same id (keeping its position).
//! 2. **Graph construction**: one node per component, one edge per reference
//!    that points at a declared component. Two components rendering the
//!    same registry path fail with [`RegistryError::PathConflict`].
//!    References are checked on the way:
//!    - a reference to a later kind fails with [`RegistryError::InvalidDependency`]
//!    - a declared reference to nothing fails with [`RegistryError::MissingDependency`]
//!    - an inferred reference to nothing is dropped silently
//! 3. **Ordering**: cycles fail with [`RegistryError::CyclicDependency`].
//!    Otherwise components are built tier by tier (gateways, datasets,
//!    schemas, relations, then commands and mappers), dependencies first, and
//!    in declaration order where nothing else decides. Connector names are
//!    checked here too, so relationship errors surface before anything is
//!    built.
//! 4. **Building**: the build block of the descriptor, or the default builder
//!    of its kind (see [`MapperDefinition`] for mappers without an adapter).
//!    Results are written at the component's registry path.
//! 5. **Connectors**: the [`RelationGraph`] is derived from the relationships
//!    of every relation, in declaration order.
//!
//! The first failure aborts the pass. Nothing built so far escapes, except
//! what the shared cache memoized.
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::adapter::AdapterSet;
//! use ormkit_registry::core::instance;
//! use ormkit_registry::declaration::Declarations;
//! use ormkit_registry::resolver::Resolver;
//!
//! let mut decls = Declarations::new();
//! decls.dataset("users").build_with(|_ctx| Ok(instance(vec!["Jane", "Joe"])));
//!
//! let registry = Resolver::new(decls, AdapterSet::new()).resolve()?;
//! let users = registry.get::<Vec<&str>>("datasets.users")?;
//! assert_eq!(*users, vec!["Jane", "Joe"]);
//! # Ok::<(), ormkit_registry::core::RegistryError>(())
//! ```

pub mod builders;
pub mod context;
pub mod dependency_graph;

pub use builders::MapperDefinition;
pub use context::BuildContext;
pub use dependency_graph::DependencyGraph;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::adapter::AdapterSet;
use crate::cache::InstanceCache;
use crate::core::{ComponentKey, ComponentKind, RegistryError};
use crate::declaration::{ComponentDescriptor, Declarations, Relationship};
use crate::registry::{Registry, RegistryEntry};
use crate::relations::{NodeName, RelationGraph, plan_connectors};

/// Outcome of [`Resolver::plan`]: what a resolution pass would do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Components in build order
    pub order: Vec<ComponentKey>,
    /// Direct dependencies of each component in `order`, at the same index
    pub dependencies: Vec<Vec<ComponentKey>>,
    /// Connector names the relation graph would derive
    pub connectors: Vec<String>,
}

/// Single-pass resolver over a set of declarations.
pub struct Resolver {
    descriptors: Vec<ComponentDescriptor>,
    adapters: AdapterSet,
    cache: Arc<InstanceCache>,
}

impl Resolver {
    /// Take ownership of the declarations.
    ///
    /// Inline schemas are hoisted immediately, so [`plan`](Self::plan) and
    /// [`resolve`](Self::resolve) see the same components.
    pub fn new(declarations: Declarations, adapters: AdapterSet) -> Self {
        Self {
            descriptors: hoist_inline_schemas(declarations.into_descriptors()),
            adapters,
            cache: Arc::new(InstanceCache::new()),
        }
    }

    /// Use an existing cache, e.g. to share gateways across registries.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<InstanceCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Number of components the pass will build.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether there is nothing to build.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validate the declarations and compute the build order without
    /// building anything.
    ///
    /// Reports the same resolution errors as [`resolve`](Self::resolve),
    /// except failures of the build procedures themselves.
    pub fn plan(&self) -> Result<Plan, RegistryError> {
        let graph = build_graph(&self.descriptors)?;
        let order = graph.build_order()?;
        let connectors = planned_connectors(&self.descriptors)?
            .iter()
            .map(NodeName::connector_name)
            .collect();
        let dependencies = order.iter().map(|key| graph.direct_dependencies(key)).collect();

        Ok(Plan {
            order,
            dependencies,
            connectors,
        })
    }

    /// Build every component and return the registry.
    pub fn resolve(self) -> Result<Registry, RegistryError> {
        let graph = build_graph(&self.descriptors)?;
        let order = graph.build_order()?;
        // Connector naming needs declarations only; fail before any adapter runs
        planned_connectors(&self.descriptors)?;
        let relations = relation_declarations(&self.descriptors);

        let mut pending: HashMap<ComponentKey, ComponentDescriptor> =
            self.descriptors.into_iter().map(|descriptor| (descriptor.key(), descriptor)).collect();
        let mut entries: BTreeMap<String, RegistryEntry> = BTreeMap::new();

        for key in order {
            let Some(mut descriptor) = pending.remove(&key) else {
                continue;
            };
            let build = descriptor.take_build();
            let custom = build.is_some();

            let entry = {
                let ctx = BuildContext::new(
                    &key,
                    descriptor.config(),
                    &entries,
                    &self.cache,
                    &self.adapters,
                );

                let instance = match build {
                    Some(build) => build(&ctx).map_err(|source| RegistryError::BuildFailed {
                        component: ctx.path().to_string(),
                        source,
                    })?,
                    None => builders::build_default(&ctx)?,
                };

                RegistryEntry::new(
                    key.clone(),
                    instance,
                    ctx.adapter_name().map(str::to_string),
                    ctx.registered_gateway().map(str::to_string),
                )
            };

            debug!(
                "Built '{}' (tier {}, {})",
                key,
                key.kind.tier(),
                if custom {
                    "build block"
                } else {
                    "default builder"
                }
            );
            entries.insert(key.path(), entry);
        }

        let relation_graph = RelationGraph::build(relations.into_iter().filter_map(
            |(id, relationships)| {
                let path = ComponentKey::new(ComponentKind::Relation, id.as_str()).path();
                let instance = Arc::clone(entries.get(&path)?.instance());
                Some((id, instance, relationships))
            },
        ))?;

        info!(
            "Resolved {} components and {} connectors",
            entries.len(),
            relation_graph.len()
        );

        Ok(Registry::new(entries, relation_graph, self.cache, self.adapters))
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("components", &self.descriptors.len())
            .field("adapters", &self.adapters)
            .finish()
    }
}

/// Lift inline schemas out of their relations.
fn hoist_inline_schemas(mut descriptors: Vec<ComponentDescriptor>) -> Vec<ComponentDescriptor> {
    let mut hoisted: HashMap<ComponentKey, ComponentDescriptor> = HashMap::new();
    let mut owners: Vec<Option<ComponentKey>> = Vec::with_capacity(descriptors.len());

    for descriptor in &mut descriptors {
        let owner = descriptor.take_inline_schema().map(|schema| {
            let key = schema.key();
            if hoisted.insert(key.clone(), schema).is_some() {
                warn!("Inline schema '{}' is declared by several relations, the last one wins", key);
            }
            key
        });
        owners.push(owner);
    }

    if hoisted.is_empty() {
        return descriptors;
    }

    let standalone: HashSet<ComponentKey> = descriptors
        .iter()
        .map(ComponentDescriptor::key)
        .filter(|key| hoisted.contains_key(key))
        .collect();

    let mut result = Vec::with_capacity(descriptors.len() + hoisted.len());
    for (descriptor, owner) in descriptors.into_iter().zip(owners) {
        let key = descriptor.key();

        if standalone.contains(&key) {
            if let Some(schema) = hoisted.remove(&key) {
                warn!("Inline schema '{}' replaces its standalone declaration", key);
                result.push(schema);
            }
            continue;
        }

        if let Some(owner) = owner {
            if !standalone.contains(&owner) {
                if let Some(schema) = hoisted.remove(&owner) {
                    result.push(schema);
                }
            }
        }
        result.push(descriptor);
    }

    result
}

/// Relations with their relationships, in declaration order.
fn relation_declarations(descriptors: &[ComponentDescriptor]) -> Vec<(String, Vec<Relationship>)> {
    descriptors
        .iter()
        .filter(|descriptor| descriptor.kind() == ComponentKind::Relation)
        .map(|descriptor| (descriptor.id().to_string(), descriptor.config().relationships.clone()))
        .collect()
}

fn planned_connectors(descriptors: &[ComponentDescriptor]) -> Result<Vec<NodeName>, RegistryError> {
    let relations = relation_declarations(descriptors);
    plan_connectors(relations.iter().map(|(id, relationships)| (id.as_str(), relationships.as_slice())))
}

fn build_graph(descriptors: &[ComponentDescriptor]) -> Result<DependencyGraph, RegistryError> {
    let mut graph = DependencyGraph::new();
    let mut paths: HashMap<String, ComponentKey> = HashMap::new();
    for (position, descriptor) in descriptors.iter().enumerate() {
        let key = descriptor.key();
        if let Some(first) = paths.insert(key.path(), key.clone()) {
            return Err(RegistryError::PathConflict {
                path: key.path(),
                first: first.describe(),
                second: key.describe(),
            });
        }
        graph.add_node(key, position);
    }

    for descriptor in descriptors {
        let key = descriptor.key();
        for (kind, reference) in descriptor.references() {
            let target = ComponentKey::new(kind, reference.id());

            if !key.kind.may_depend_on(kind) {
                return Err(RegistryError::InvalidDependency {
                    component: key.path(),
                    dependency: target.path(),
                });
            }

            if graph.contains(&target) {
                graph.add_dependency(&key, &target);
            } else if reference.is_declared() {
                return Err(RegistryError::MissingDependency {
                    component: key.path(),
                    kind: kind.to_string(),
                    id: reference.id().to_string(),
                });
            }
        }
    }

    Ok(graph)
}
