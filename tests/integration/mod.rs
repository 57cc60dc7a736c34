//! Integration test suite for ormkit-registry
//!
//! End-to-end tests going through the public API: declarations are resolved
//! with the in-memory adapter from `test_utils` and the resulting registry is
//! inspected, or the `ormkit` binary is run against setup files.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **runtime**: Building gateways, datasets, schemas, relations, commands and mappers
//! - **resolution**: Ordering and resolution failures
//! - **relations**: Connector derivation and traversal
//! - **setup**: Setup files resolved end to end
//! - **cli**: The `ormkit` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod relations;
mod resolution;
mod runtime;
mod setup;
