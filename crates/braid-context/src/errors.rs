//! Context error types.

use crate::llm::LlmError;

/// Errors from context assembly and the prose services.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] braid_store::StoreError),

    /// The language-model collaborator failed.
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Crate-local result alias.
pub type Result<T> = std::result::Result<T, ContextError>;
