//! Common Error Types

use thiserror::Error;

/// A field required by the caller is absent from the webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("payload is missing field `{path}`")]
pub struct MissingField {
    /// Dotted path of the absent field (e.g. `installation.id`).
    pub path: &'static str,
}

impl MissingField {
    /// Create an error for the given dotted path.
    #[must_use]
    pub const fn new(path: &'static str) -> Self {
        Self { path }
    }
}

/// Result type for payload lookups.
pub type Result<T> = std::result::Result<T, MissingField>;
