//! Common helpers for the ormkit-registry integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use ormkit_registry::adapter::AdapterSet;
use ormkit_registry::test_utils::{MemoryAdapter, init_test_logging};
use tempfile::TempDir;

/// A setup file exercising every section.
pub const FULL_SETUP: &str = r#"
[naming]
namespace = "Persistence"

[gateways.default]
adapter = "memory"

[datasets.users]
gateway = "default"

[relations.users]
relationships = [{ name = "tasks", target = "tasks" }]

[relations.tasks]
relationships = [{ name = "owner", target = "users", kind = "many-to-one" }]

[commands.users]
define = ["create"]

[mappers.users]
define = ["entity"]
"#;

/// A memory adapter plus an adapter set containing a clone of it.
///
/// The returned adapter shares its counters with the registered one.
pub fn memory_adapters() -> (MemoryAdapter, AdapterSet) {
    init_test_logging(None);
    let adapter = MemoryAdapter::new();
    let adapters = AdapterSet::new().with(adapter.clone());
    (adapter, adapters)
}

/// A temporary directory holding a setup file.
pub struct SetupProject {
    temp: TempDir,
}

impl SetupProject {
    /// Create a project with `ormkit.toml` containing `content`.
    pub fn new(content: &str) -> Self {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("ormkit.toml"), content).unwrap();
        Self {
            temp,
        }
    }

    /// Project directory.
    pub fn dir(&self) -> PathBuf {
        self.temp.path().to_path_buf()
    }

    /// Path of the setup file.
    pub fn setup_path(&self) -> PathBuf {
        self.temp.path().join("ormkit.toml")
    }
}
