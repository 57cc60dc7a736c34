//! ormkit-registry - declarative component registry for data-access runtimes
//!
//! Gateways, datasets, schemas, relations, commands and mappers are declared
//! independently, in any order, referencing each other by identifier only.
//! A single resolution pass then builds every component exactly once,
//! dependencies first, and hands out an immutable [`Registry`](registry::Registry)
//! of live instances.
//!
//! # Architecture Overview
//!
//! ```text
//! Declarations ──► Resolver ──► Registry
//!   (pending        │  ▲          ├── "datasets.users"  → instance
//!    descriptors)   │  │          ├── "relations.users" → instance
//!                   ▼  │          └── RelationGraph (connectors)
//!              NamespacedCache
//!        (gateways, lazily created datasets)
//! ```
//!
//! 1. **Declaration**: [`declaration::Declarations`] accumulates
//!    [`declaration::ComponentDescriptor`]s. Nothing is built yet.
//! 2. **Resolution**: [`resolver::Resolver`] orders components by tier
//!    (gateway, dataset, schema, relation, then command and mapper) and by
//!    their references, detects missing and cyclic dependencies, and builds
//!    each component through its build block or the [`adapter::Adapter`]
//!    named in its configuration.
//! 3. **Connection**: relationships between relations become named
//!    [`relations::Connector`]s, so joins can be planned by traversing the
//!    graph.
//! 4. **Lookup**: consumers read the [`registry::Registry`] by dotted path.
//!
//! # Core Modules
//!
//! - [`cache`] - Memoizing cache with independent namespaces
//! - [`declaration`] - Component descriptors and the declaration accumulator
//! - [`resolver`] - Dependency graph, build order and default builders
//! - [`registry`] - The resolved, read-only registry
//! - [`relations`] - Relation connector graph
//! - [`naming`] - Naming strategies for auto-discovered definitions
//! - [`adapter`] - Contract for storage backends
//! - [`config`] - TOML setup files
//! - [`core`] - Component kinds, keys, errors and instance handles
//! - [`cli`] - The `ormkit` command-line interface
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::adapter::AdapterSet;
//! use ormkit_registry::core::instance;
//! use ormkit_registry::declaration::{Declarations, RelationshipKind};
//! use ormkit_registry::resolver::Resolver;
//!
//! let mut decls = Declarations::new();
//! decls
//!     .relation("users")
//!     .relationship("tasks", "tasks", RelationshipKind::OneToMany)
//!     .build_with(|_ctx| Ok(instance("users relation")));
//! decls.relation("tasks").build_with(|_ctx| Ok(instance("tasks relation")));
//!
//! let registry = Resolver::new(decls, AdapterSet::new()).resolve()?;
//! assert!(registry.contains("relations.users"));
//! assert!(registry.relations().connector("users_X_tasks__tasks").is_some());
//! # Ok::<(), ormkit_registry::core::RegistryError>(())
//! ```

// Core functionality modules
pub mod cache;
pub mod core;
pub mod declaration;
pub mod registry;
pub mod relations;
pub mod resolver;

// Integration surfaces
pub mod adapter;
pub mod cli;
pub mod config;
pub mod naming;

// Supporting modules
pub mod constants;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
