//! Route-level error mapping.
//!
//! Taxonomy from the pipeline surfaces here: data absence becomes 404,
//! caller mistakes 400, the LLM collaborator failing 502, and persistence
//! trouble 500. Transient embedding/cache/index degradation never reaches
//! this module — those are absorbed below as empty results.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use braid_context::ContextError;
use braid_runtime::RuntimeError;

/// Error a route hands back to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// The requested data does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The prose collaborator is unavailable.
    #[error("language model unavailable: {0}")]
    Upstream(String),

    /// Unexpected persistence failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ContextError> for ApiError {
    fn from(e: ContextError) -> Self {
        match e {
            ContextError::Llm(e) => Self::Upstream(e.to_string()),
            ContextError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<RuntimeError> for ApiError {
    fn from(e: RuntimeError) -> Self {
        match e {
            RuntimeError::Store(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<braid_store::StoreError> for ApiError {
    fn from(e: braid_store::StoreError) -> Self {
        Self::Internal(e.to_string())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
