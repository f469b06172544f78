//! Refetch error types

/// Refetch error types
///
/// `Clone` is required: a fetch failure is stored in the cache entry's
/// `error` field (read on every poll) and simultaneously delivered through
/// the one-shot completion channel of a pending
/// [`run`](crate::RequestController::run).
#[derive(Debug, Clone, thiserror::Error)]
pub enum RefetchError {
    // Fetch-function errors
    #[error("fetch failed: {0}")]
    Fetch(String),

    // Collaborator errors
    #[error("cache error: {0}")]
    Cache(String),

    // Internal errors
    #[error("internal error: {0}")]
    Internal(String),

    /// The completion channel was dropped before the fetch settled.
    ///
    /// Happens when the collaborator discards a subscription (or the
    /// controller is torn down) while a `run` call is still awaiting its
    /// outcome.
    #[error("completion channel closed before the fetch settled")]
    BridgeClosed,
}

impl RefetchError {
    /// Wrap an arbitrary error as a fetch failure.
    pub fn fetch(err: impl std::fmt::Display) -> Self {
        RefetchError::Fetch(err.to_string())
    }

    /// Wrap an arbitrary error as a collaborator failure.
    pub fn cache(err: impl std::fmt::Display) -> Self {
        RefetchError::Cache(err.to_string())
    }
}

/// Result type alias for refetch operations
pub type Result<T> = std::result::Result<T, RefetchError>;
