//! Global constants used throughout the registry.
//!
//! Defining them centrally keeps default identifiers and cache namespace
//! names consistent between the declaration surface, the resolver and the
//! registry's lazy accessors.

/// Gateway identifier inferred when a schema or relation names none.
pub const DEFAULT_GATEWAY: &str = "default";

/// Cache namespace holding gateway instances.
///
/// One child namespace per adapter name, keyed by gateway id.
pub const GATEWAY_CACHE: &str = "gateways";

/// Cache namespace holding datasets created through a gateway.
///
/// Nested by adapter name, then gateway id, keyed by dataset name.
pub const DATASET_CACHE: &str = "datasets";

/// Separator between a namespace and a type name in derived component names.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Environment variable naming the default setup file for the CLI.
pub const SETUP_ENV_VAR: &str = "ORMKIT_SETUP";

/// Setup file name looked up in the working directory when none is given.
pub const DEFAULT_SETUP_FILE: &str = "ormkit.toml";
