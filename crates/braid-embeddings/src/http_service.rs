//! HTTP embedding backend for HuggingFace-style inference endpoints.
//!
//! Request: `{"inputs": <text>, "options": {"wait_for_model": true}}` with
//! optional bearer auth. The response shape varies by model and is decoded
//! by [`crate::decode`]; anything the decoder does not recognize — along
//! with non-200 statuses and transport errors — becomes an empty vector so
//! retrieval degrades to "no semantic hits" instead of failing.

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::config::{EmbeddingConfig, QUERY_INSTRUCTION};
use crate::decode::{DecodedEmbedding, decode_embedding};
use crate::errors::{EmbeddingError, Result};
use crate::service::EmbeddingService;

/// Embedding client for an HTTP inference provider.
pub struct HttpEmbeddingService {
    config: EmbeddingConfig,
    client: reqwest::Client,
}

impl HttpEmbeddingService {
    /// Build a client for the given provider configuration.
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| EmbeddingError::Internal(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }

    /// Apply the instruction prefix for instruction-conditioned models.
    fn prepare_input<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        if self.config.wants_instruction_prefix() && !text.starts_with(QUERY_INSTRUCTION) {
            std::borrow::Cow::Owned(format!("{QUERY_INSTRUCTION}{text}"))
        } else {
            std::borrow::Cow::Borrowed(text)
        }
    }

    async fn call_provider(&self, text: &str) -> Vec<f32> {
        let payload = json!({
            "inputs": text,
            "options": {"wait_for_model": true},
        });

        let mut request = self.client.post(self.config.model_url()).json(&payload);
        if let Some(ref token) = self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(model = %self.config.model, error = %e, "embedding request failed");
                return Vec::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(model = %self.config.model, %status, body, "embedding provider returned error");
            return Vec::new();
        }

        let body: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                warn!(model = %self.config.model, error = %e, "embedding response was not JSON");
                return Vec::new();
            }
        };

        match decode_embedding(&body) {
            DecodedEmbedding::Vector(v) => {
                debug!(model = %self.config.model, dimensions = v.len(), "embedding generated");
                v
            }
            DecodedEmbedding::Unrecognized => {
                warn!(model = %self.config.model, "unrecognized embedding response shape");
                Vec::new()
            }
        }
    }
}

#[async_trait]
impl EmbeddingService for HttpEmbeddingService {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            debug!("empty text given to embed");
            return Ok(Vec::new());
        }
        let input = self.prepare_input(text);
        Ok(self.call_provider(&input).await)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> EmbeddingConfig {
        EmbeddingConfig {
            endpoint: server.uri(),
            model: "test/model".to_owned(),
            api_token: None,
            dimensions: 4,
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn decodes_flat_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/test/model"))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![0.1f32, 0.2, 0.3, 0.4]))
            .mount(&server)
            .await;

        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let v = svc.embed_one("some chunk text").await.unwrap();
        assert_eq!(v, vec![0.1, 0.2, 0.3, 0.4]);
    }

    #[tokio::test]
    async fn decodes_nested_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(vec![vec![1.0f32, 2.0, 3.0, 4.0]]),
            )
            .mount(&server)
            .await;

        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let v = svc.embed_one("text").await.unwrap();
        assert_eq!(v, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[tokio::test]
    async fn sends_wait_for_model_option() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(
                serde_json::json!({"options": {"wait_for_model": true}}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![0.5f32]))
            .expect(1)
            .mount(&server)
            .await;

        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let _ = svc.embed_one("text").await.unwrap();
    }

    #[tokio::test]
    async fn provider_error_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("model loading"))
            .mount(&server)
            .await;

        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let v = svc.embed_one("text").await.unwrap();
        assert!(v.is_empty());
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_to_empty() {
        // Nothing is listening at this address
        let config = EmbeddingConfig {
            endpoint: "http://127.0.0.1:1".to_owned(),
            model: "test/model".to_owned(),
            api_token: None,
            dimensions: 4,
            timeout_secs: 1,
        };
        let svc = HttpEmbeddingService::new(config).unwrap();
        let v = svc.embed_one("text").await.unwrap();
        assert!(v.is_empty());
    }

    #[tokio::test]
    async fn unrecognized_shape_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"vectors": [[1.0, 2.0]]})),
            )
            .mount(&server)
            .await;

        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let v = svc.embed_one("text").await.unwrap();
        assert!(v.is_empty());
    }

    #[tokio::test]
    async fn empty_text_skips_provider() {
        let server = MockServer::start().await;
        // No mock mounted — a request would 404 and still degrade, but the
        // expectation is that no request is made at all.
        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let v = svc.embed_one("").await.unwrap();
        assert!(v.is_empty());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn bge_models_get_instruction_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "inputs": format!("{QUERY_INSTRUCTION}find the meeting time"),
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![0.1f32]))
            .expect(1)
            .mount(&server)
            .await;

        let config = EmbeddingConfig {
            model: "BAAI/bge-small-en-v1.5".to_owned(),
            endpoint: server.uri(),
            api_token: None,
            dimensions: 4,
            timeout_secs: 5,
        };
        let svc = HttpEmbeddingService::new(config).unwrap();
        let _ = svc.embed_one("find the meeting time").await.unwrap();
    }

    #[tokio::test]
    async fn non_bge_models_send_raw_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({"inputs": "raw text"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(vec![0.1f32]))
            .expect(1)
            .mount(&server)
            .await;

        let svc = HttpEmbeddingService::new(config_for(&server)).unwrap();
        let _ = svc.embed_one("raw text").await.unwrap();
    }
}
