//! Error types for the list core.

use thiserror::Error;

/// Result type for list operations.
pub type ListResult<T> = Result<T, ListError>;

/// Errors that can occur in the list core.
///
/// Only construction can fail from a caller's point of view. Store failures
/// during fetches are reported to the observer instead of being returned.
#[derive(Debug, Error)]
pub enum ListError {
    /// The configuration is missing a required option or holds an
    /// out-of-range value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// The store rejected an action.
    #[error("store error: {0}")]
    Store(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
