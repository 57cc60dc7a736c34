//! Test utilities for ormkit-registry
//!
//! Available to unit tests and, through the `test-utils` feature, to the
//! integration test suite.
//!
//! - [`init_test_logging`] - tracing output inside tests
//! - [`memory`] - an in-memory [`Adapter`](crate::adapter::Adapter) whose
//!   instances are concrete types tests can downcast and compare by identity
//!
//! # Example
//!
//! ```rust,ignore
//! use ormkit_registry::adapter::AdapterSet;
//! use ormkit_registry::declaration::Declarations;
//! use ormkit_registry::resolver::Resolver;
//! use ormkit_registry::test_utils::{MemoryAdapter, MemoryDataset};
//!
//! let adapter = MemoryAdapter::new();
//! let mut decls = Declarations::new();
//! decls.gateway("default").adapter("memory");
//! decls.dataset("users").gateway("default");
//!
//! let registry = Resolver::new(decls, AdapterSet::new().with(adapter.clone()))
//!     .resolve()
//!     .unwrap();
//! let users = registry.get::<MemoryDataset>("datasets.users").unwrap();
//! assert_eq!(users.name, "users");
//! assert_eq!(adapter.gateways_opened(), 1);
//! ```

pub mod memory;

pub use memory::{
    MemoryAdapter, MemoryCommand, MemoryDataset, MemoryGateway, MemoryRelation, MemorySchema,
};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, tests run without logging.
///
/// ```bash
/// RUST_LOG=ormkit_registry=trace cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer() // Important: uses test-compatible writer
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
