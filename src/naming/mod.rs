//! Naming strategies for auto-discovered component definitions
//!
//! When components are discovered from files instead of declared by hand,
//! a [`NamingStrategy`] turns each file path into the fully qualified type
//! name the definition is expected under. The base name loses its extension
//! and is converted to upper camel case; the strategy decides the namespace:
//!
//! | Strategy            | `persistence/relations/user_tasks.rb` |
//! |---------------------|---------------------------------------|
//! | [`NoNamespace`]     | `UserTasks`                           |
//! | [`WithNamespace`]   | `Persistence::Relations::UserTasks` (root `.`) |
//! | [`CustomNamespace`] | `Main::UserTasks` (namespace `Main`)  |
//!
//! Strategies are pure: no file is opened.

use heck::{ToLowerCamelCase, ToUpperCamelCase};
use std::path::{Component, Path, PathBuf};

use crate::constants::NAMESPACE_SEPARATOR;

/// Maps a discovered definition file to a component type name.
pub trait NamingStrategy {
    /// Fully qualified name for the definition at `path`.
    fn component_name(&self, path: &Path) -> String;
}

/// Base name only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoNamespace;

impl NamingStrategy for NoNamespace {
    fn component_name(&self, path: &Path) -> String {
        type_name(path)
    }
}

/// Directories between `root` and the file become the namespace.
#[derive(Debug, Clone)]
pub struct WithNamespace {
    root: PathBuf,
}

impl WithNamespace {
    /// Strategy resolving paths relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }
}

impl NamingStrategy for WithNamespace {
    fn component_name(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);

        let mut segments: Vec<String> = relative
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .filter_map(|component| match component {
                        Component::Normal(name) => Some(name.to_string_lossy().to_upper_camel_case()),
                        _ => None,
                    })
                    .filter(|segment| !segment.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        segments.push(type_name(path));
        segments.join(NAMESPACE_SEPARATOR)
    }
}

/// A fixed namespace prefix.
#[derive(Debug, Clone)]
pub struct CustomNamespace {
    namespace: String,
}

impl CustomNamespace {
    /// Strategy prefixing every name with `namespace`.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl NamingStrategy for CustomNamespace {
    fn component_name(&self, path: &Path) -> String {
        if self.namespace.is_empty() {
            return type_name(path);
        }
        format!("{}{}{}", self.namespace, NAMESPACE_SEPARATOR, type_name(path))
    }
}

/// Upper camel case base name of `path` without its last extension.
///
/// Inner dots survive: `foo.bar_baz.rb` becomes `Foo.barBaz`.
fn type_name(path: &Path) -> String {
    let Some(stem) = path.file_stem() else {
        return String::new();
    };
    let stem = stem.to_string_lossy();
    let mut segments = stem.split('.');

    let mut name = segments.next().map(|first| first.to_upper_camel_case()).unwrap_or_default();
    for segment in segments {
        name.push('.');
        name.push_str(&segment.to_lower_camel_case());
    }
    name
}
