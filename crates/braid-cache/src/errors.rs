//! Cache error types.

/// Errors surfaced by cache backends.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The backing store failed or is unreachable.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, CacheError>;
