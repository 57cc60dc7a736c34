//! Deterministic connector names.

use std::fmt;

/// Canonical name of a connector between two relations.
///
/// The name is order sensitive: `users → tasks` and `tasks → users` derive
/// different names even for the same relationship name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeName {
    left: String,
    right: String,
    relationship: String,
}

impl NodeName {
    /// Name of the connector from `left` to `right` through `relationship`.
    pub fn new(
        left: impl Into<String>,
        right: impl Into<String>,
        relationship: impl Into<String>,
    ) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
            relationship: relationship.into(),
        }
    }

    /// Source relation.
    pub fn left(&self) -> &str {
        &self.left
    }

    /// Target relation.
    pub fn right(&self) -> &str {
        &self.right
    }

    /// Relationship name.
    pub fn relationship(&self) -> &str {
        &self.relationship
    }

    /// Rendered name, `"<left>_X_<right>__<relationship>"`.
    #[must_use]
    pub fn connector_name(&self) -> String {
        format!("{}_X_{}__{}", self.left, self.right, self.relationship)
    }

    /// `"<left>.<relationship>"`, used when reporting collisions.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{}.{}", self.left, self.relationship)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connector_name())
    }
}
