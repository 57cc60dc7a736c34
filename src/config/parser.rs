//! Generic configuration parsing utilities.
//!
//! Reads a TOML file into any `DeserializeOwned` type and attaches the file
//! path to every error, so a failure reads:
//!
//! ```text
//! Failed to parse config file: /path/to/ormkit.toml
//! Caused by:
//!     invalid type: integer `1`, expected a string
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Examples
///
/// ```rust,no_run
/// use ormkit_registry::config::{SetupFile, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let setup: SetupFile = parse_config(Path::new("ormkit.toml"))?;
/// println!("{} relations", setup.relations.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails when the file cannot be read, is not valid TOML, or does not match
/// the structure of `T`. The underlying IO or TOML error is kept as the cause.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
