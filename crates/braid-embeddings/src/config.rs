//! Embedding configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default embedding model.
pub const DEFAULT_MODEL: &str = "BAAI/bge-small-en-v1.5";

/// Default output dimensions (bge-small-en-v1.5).
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Instruction prepended to inputs for instruction-conditioned models.
pub const QUERY_INSTRUCTION: &str = "Represent this sentence for searching relevant passages: ";

/// Configuration for the embedding provider.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Inference endpoint base URL (the model path is appended).
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Bearer token, when the provider requires one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Output vector dimensions.
    pub dimensions: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_owned(),
            model: DEFAULT_MODEL.to_owned(),
            api_token: None,
            dimensions: DEFAULT_DIMENSIONS,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Full URL for the configured model.
    pub fn model_url(&self) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), self.model)
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Whether the configured model expects an instruction prefix on inputs.
    pub fn wants_instruction_prefix(&self) -> bool {
        self.model.to_lowercase().contains("bge")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_dimensions() {
        assert_eq!(EmbeddingConfig::default().dimensions, 384);
    }

    #[test]
    fn model_url_joins_cleanly() {
        let config = EmbeddingConfig {
            endpoint: "http://localhost:9000/".to_owned(),
            model: "my/model".to_owned(),
            ..EmbeddingConfig::default()
        };
        assert_eq!(config.model_url(), "http://localhost:9000/my/model");
    }

    #[test]
    fn bge_models_want_instruction() {
        assert!(EmbeddingConfig::default().wants_instruction_prefix());
        let other = EmbeddingConfig {
            model: "sentence-transformers/all-MiniLM-L6-v2".to_owned(),
            ..EmbeddingConfig::default()
        };
        assert!(!other.wants_instruction_prefix());
    }
}
