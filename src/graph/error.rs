//! Dependency graph error types.

use thiserror::Error;

/// Errors raised by graph mutation and restoration.
///
/// Queries never fail: unknown nodes are reported through
/// [`Lookup::Unknown`](super::Lookup) instead.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The dependency list handed to `add_dependency` was not a list.
    #[error("second argument to `add_dependency` must be a list, received: {0}")]
    InvalidArgument(String),

    /// A node value could not be turned into a string key.
    #[error("dependency graph nodes must be strings, received: {0}")]
    InvalidNodeType(String),

    /// Persisted graph text was malformed or inconsistent.
    #[error("failed to restore dependency graph: {0}")]
    Deserialization(String),

    /// The graph could not be encoded.
    #[error("failed to serialize dependency graph")]
    Serialization(#[source] serde_json::Error),
}

impl GraphError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Deserialization(reason.into())
    }
}
