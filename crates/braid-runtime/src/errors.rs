//! Runtime error types.

/// Errors from the write path.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] braid_store::StoreError),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, RuntimeError>;
