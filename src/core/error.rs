//! Error handling for the component registry
//!
//! The error system follows two rules:
//! 1. **Strongly-typed errors** ([`RegistryError`]) for precise handling in code
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions for the CLI
//!
//! # Error Categories
//!
//! - **Resolution** (fatal, abort the whole pass): [`RegistryError::MissingDependency`],
//!   [`RegistryError::CyclicDependency`], [`RegistryError::InvalidDependency`],
//!   [`RegistryError::AdapterNotFound`], [`RegistryError::NoBuilder`],
//!   [`RegistryError::BuildFailed`], [`RegistryError::PathConflict`]
//! - **Relation graph** (fatal): [`RegistryError::DuplicateConnector`],
//!   [`RegistryError::AmbiguousConnector`]
//! - **Lookup** (recoverable): [`RegistryError::NotFound`], [`RegistryError::TypeMismatch`]
//! - **Configuration**: [`RegistryError::ConfigError`], [`RegistryError::TomlError`],
//!   [`RegistryError::IoError`], [`RegistryError::UnknownKind`]
//!
//! A resolution pass never hands out a partially built registry: the first
//! resolution error is returned and everything built so far is dropped.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ormkit_registry::core::{RegistryError, user_friendly_error};
//!
//! let error = RegistryError::NotFound {
//!     path: "relations.people".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // colored output with a suggestion
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for registry declaration, resolution and lookup
///
/// Variants carry the registry path of the component involved (for example
/// `"datasets.users"`) so messages point straight at the offending
/// declaration.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// A component references an identifier that was never declared
    ///
    /// Only *declared* references produce this error. References inferred
    /// as defaults (such as a relation's `gateway = "default"`) are allowed
    /// to point at nothing.
    #[error("Component '{component}' references {kind} '{id}' which was never declared")]
    MissingDependency {
        /// Registry path of the component holding the reference
        component: String,
        /// Kind of the missing component
        kind: String,
        /// Identifier that could not be found
        id: String,
    },

    /// A reference cycle was found between components of the same tier
    #[error("Circular dependency detected: {chain}")]
    CyclicDependency {
        /// Rendered cycle, e.g. `relations.a → relations.b → relations.a`
        chain: String,
    },

    /// A component references a kind that is built after its own kind
    #[error("Component '{component}' cannot depend on '{dependency}': it is built later")]
    InvalidDependency {
        /// Registry path of the component holding the reference
        component: String,
        /// Registry path of the referenced component
        dependency: String,
    },

    /// Two relationships derive the same connector name
    #[error(
        "Duplicate connector '{name}': relationships '{existing}' and '{duplicate}' derive the same name"
    )]
    DuplicateConnector {
        /// The derived connector name
        name: String,
        /// The relationship that registered the name first
        existing: String,
        /// The relationship that collided with it
        duplicate: String,
    },

    /// Two relationships that differ render the same connector name
    ///
    /// Happens when identifiers contain the `_X_` or `__` separators.
    #[error(
        "Ambiguous connector '{name}': relationships '{existing}' and '{duplicate}' differ but render the same name"
    )]
    AmbiguousConnector {
        /// The rendered connector name
        name: String,
        /// The relationship that registered the name first, `relation.name → target`
        existing: String,
        /// The relationship that collided with it, `relation.name → target`
        duplicate: String,
    },

    /// Two distinct components render the same registry path
    #[error("Components {first} and {second} would both be registered at '{path}'")]
    PathConflict {
        /// The shared registry path
        path: String,
        /// The component declared first
        first: String,
        /// The component declared later
        second: String,
    },

    /// Registry lookup of a path that was never registered
    #[error("No component registered at '{path}'")]
    NotFound {
        /// The path that was looked up
        path: String,
    },

    /// A registered instance is not of the requested type
    #[error("Component at '{path}' is not a {expected}")]
    TypeMismatch {
        /// The path that was looked up
        path: String,
        /// Name of the requested type
        expected: String,
    },

    /// An adapter is required but not registered or not inferable
    #[error("Adapter '{adapter}' required by '{component}' is not registered")]
    AdapterNotFound {
        /// Adapter name, or `<none>` when nothing could be inferred
        adapter: String,
        /// Registry path of the component
        component: String,
    },

    /// Nothing is able to build a component
    #[error("No way to build '{component}': {reason}")]
    NoBuilder {
        /// Registry path of the component
        component: String,
        /// Why neither a build block nor a default builder applies
        reason: String,
    },

    /// A build procedure or adapter constructor failed
    #[error("Failed to build '{component}'")]
    BuildFailed {
        /// Registry path of the component
        component: String,
        /// Error returned by the build procedure
        #[source]
        source: anyhow::Error,
    },

    /// Unknown component kind name
    #[error("Unknown component kind: {kind}")]
    UnknownKind {
        /// The kind string that failed to parse
        kind: String,
    },

    /// Setup file content is structurally valid TOML but not a valid setup
    #[error("Invalid setup configuration: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl RegistryError {
    /// Whether this error is a normal lookup outcome rather than a fatal
    /// resolution failure.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. } | RegistryError::TypeMismatch { .. })
    }
}

/// Error context wrapper that adds user-facing guidance to a [`RegistryError`]
///
/// Mirrors what the CLI prints: the error itself, optional details explaining
/// the situation, and an optional suggestion for fixing it.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying registry error
    pub error: RegistryError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: RegistryError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with suggestions.
///
/// Registry errors get tailored guidance; IO and TOML errors are wrapped into
/// the matching registry variants; anything else is reported as a
/// configuration error carrying the full cause chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<RegistryError>() {
        Ok(registry_error) => return create_error_context(registry_error),
        Err(error) => error,
    };

    // Context layers name the file; keep them when unwrapping the cause
    let outer = (error.chain().count() > 1).then(|| error.to_string());

    let error = match error.downcast::<toml::de::Error>() {
        Ok(toml_error) => {
            return ErrorContext::new(RegistryError::TomlError(toml_error))
                .with_suggestion("Check the TOML syntax of the setup file")
                .with_details(
                    outer.unwrap_or_else(|| "Each component is a table such as [relations.users]".to_string()),
                );
        }
        Err(error) => error,
    };

    let error = match error.downcast::<std::io::Error>() {
        Ok(io_error) => {
            let context = ErrorContext::new(RegistryError::IoError(io_error))
                .with_suggestion("Check that the file exists and is readable");
            return match outer {
                Some(outer) => context.with_details(outer),
                None => context,
            };
        }
        Err(error) => error,
    };

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(RegistryError::ConfigError {
        message,
    })
}

fn create_error_context(error: RegistryError) -> ErrorContext {
    match &error {
        RegistryError::MissingDependency {
            kind,
            id,
            ..
        } => {
            let suggestion = format!("Declare the {kind} '{id}' or fix the reference");
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("References are resolved by identifier after all declarations are collected")
        }
        RegistryError::CyclicDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Break the cycle by removing one of the references in the chain"),
        RegistryError::InvalidDependency {
            ..
        } => ErrorContext::new(error)
            .with_details("Build order is gateways, datasets, schemas, relations, then commands and mappers")
            .with_suggestion("Only reference components of an earlier or the same kind"),
        RegistryError::DuplicateConnector {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Give the relationships distinct names")
            .with_details("Connector names combine source relation, target relation and relationship name"),
        RegistryError::AmbiguousConnector {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Avoid '_X_' and '__' in relation ids and relationship names"),
        RegistryError::PathConflict {
            ..
        } => ErrorContext::new(error)
            .with_details("Registry paths join kind, namespace and id with '.'")
            .with_suggestion("Avoid '.' in component ids and relation ids"),
        RegistryError::NotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Paths look like 'relations.users' or 'commands.users.create'"),
        RegistryError::AdapterNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Register the adapter before resolving, or set 'adapter' on the component"),
        RegistryError::NoBuilder {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Provide a build block or reference a gateway with an adapter"),
        _ => ErrorContext::new(error),
    }
}
