//! Store error types.

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// SQLite-level failure.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool failure.
    #[error("pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// A JSON column failed to encode or decode.
    #[error("json column error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, StoreError>;
