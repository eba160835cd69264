//! Vector index error types.

/// Errors from index persistence and decoding.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Filesystem failure while reading or writing index files.
    #[error("index io error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted index file did not decode.
    #[error("corrupt index file: {0}")]
    Corrupt(String),

    /// The chunk-id map file did not decode.
    #[error("corrupt id map: {0}")]
    Map(#[from] serde_json::Error),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, IndexError>;
