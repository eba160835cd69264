//! OpenAI-style chat-completions client for the prose collaborator.
//!
//! The pipeline treats the language model as an opaque `prompt + text ->
//! text` function; this is the production implementation of that function.
//! Unlike the embedding client, failures here are *not* absorbed — the
//! summarizer and drafter have nothing to return without a completion, so
//! the error propagates and the route maps it to 502.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use braid_context::{LlmClient, LlmError};

/// Configuration for the chat provider.
#[derive(Clone, Debug)]
pub struct LlmConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Model identifier.
    pub model: String,
    /// Bearer API key, when required.
    pub api_key: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_owned(),
            model: "gpt-4o-mini".to_owned(),
            api_key: None,
            temperature: 0.3,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

/// HTTP chat-completions [`LlmClient`].
pub struct HttpLlmClient {
    config: LlmConfig,
    client: reqwest::Client,
}

impl HttpLlmClient {
    /// Build a client for the given provider configuration.
    pub fn new(config: LlmConfig) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| LlmError(format!("http client: {e}")))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError> {
        let payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_text},
            ],
            "temperature": self.config.temperature,
        });

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(ref key) = self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LlmError(format!("request failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError(format!("provider returned {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError(format!("bad response body: {e}")))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError("response had no choices".into()))?;

        debug!(model = %self.config.model, chars = content.len(), "completion received");
        Ok(content.trim().to_owned())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
