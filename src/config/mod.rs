//! Configuration loading for the registry
//!
//! Declarations are normally written in code through
//! [`Declarations`](crate::declaration::Declarations). A project may also keep
//! them in a TOML *setup file*, which is what the `ormkit` CLI reads.
//!
//! # Modules
//!
//! - `parser` - Generic TOML parsing with file context on errors
//! - `setup` - The setup file format and its conversion into declarations
//!
//! # Locating the Setup File
//!
//! The CLI uses, in order:
//! 1. the path given on the command line
//! 2. the `ORMKIT_SETUP` environment variable
//! 3. `ormkit.toml` in the working directory
//!
//! # Example
//!
//! ```rust
//! use ormkit_registry::config::SetupFile;
//!
//! let setup = SetupFile::parse(
//!     r#"
//!     [gateways.default]
//!     adapter = "memory"
//!
//!     [relations.users]
//!     "#,
//! )?;
//! let decls = setup.into_declarations()?;
//! assert_eq!(decls.len(), 2);
//! # Ok::<(), ormkit_registry::core::RegistryError>(())
//! ```

mod parser;
mod setup;

pub use parser::parse_config;
pub use setup::{GroupConfig, NamingConfig, SetupFile};

use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_SETUP_FILE, SETUP_ENV_VAR};

/// Pick the setup file to load.
///
/// `explicit` wins, then `env_value` (the value of `ORMKIT_SETUP`), then
/// `ormkit.toml` inside `cwd`.
pub fn locate_setup_file(explicit: Option<&Path>, env_value: Option<&str>, cwd: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env_value {
        Some(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => cwd.join(DEFAULT_SETUP_FILE),
    }
}

/// [`locate_setup_file`] reading `ORMKIT_SETUP` and the working directory
/// from the process environment.
pub fn setup_file_from_env(explicit: Option<&Path>) -> PathBuf {
    let env_value = std::env::var(SETUP_ENV_VAR).ok();
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    locate_setup_file(explicit, env_value.as_deref(), &cwd)
}
