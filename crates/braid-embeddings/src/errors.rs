//! Embedding error types.

/// Errors surfaced by embedding backends.
///
/// The HTTP backend converts provider-side trouble into empty vectors
/// rather than errors; these variants cover caller-side misuse and backends
/// that are configured to fail loudly (test fakes).
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// The backend is not ready to serve requests.
    #[error("embedding service not ready")]
    NotReady,

    /// The backend failed while producing a vector.
    #[error("embedding inference failed: {0}")]
    Inference(String),

    /// Internal invariant violation.
    #[error("embedding internal error: {0}")]
    Internal(String),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, EmbeddingError>;
