//! The language-model collaborator seam.
//!
//! The pipeline never talks to a provider directly; everything prose-shaped
//! goes through [`LlmClient`], an opaque `prompt + text -> text` function
//! that may fail transiently. Tests and offline runs use
//! [`MockLlmClient`].

use async_trait::async_trait;
use parking_lot::Mutex;

/// Failure of the language-model collaborator.
#[derive(Debug, thiserror::Error)]
#[error("llm call failed: {0}")]
pub struct LlmError(pub String);

/// Opaque prose transformation.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Transform `user_text` under `system_prompt`.
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError>;
}

/// Scripted LLM for tests.
///
/// Returns a canned response and records every call so tests can assert on
/// the prompts the services build.
#[derive(Default)]
pub struct MockLlmClient {
    response: Mutex<Option<String>>,
    fail: Mutex<bool>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockLlmClient {
    /// Mock that answers every call with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Mutex::new(Some(response.into())),
            fail: Mutex::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock that fails every call.
    pub fn failing() -> Self {
        Self {
            response: Mutex::new(None),
            fail: Mutex::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(system_prompt, user_text)` pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().clone()
    }

    /// Number of calls seen so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, system_prompt: &str, user_text: &str) -> Result<String, LlmError> {
        self.calls
            .lock()
            .push((system_prompt.to_owned(), user_text.to_owned()));
        if *self.fail.lock() {
            return Err(LlmError("provider unavailable".into()));
        }
        Ok(self
            .response
            .lock()
            .clone()
            .unwrap_or_else(|| "mock response".to_owned()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_scripted_response() {
        let llm = MockLlmClient::with_response("the summary");
        let out = llm.complete("system", "text").await.unwrap();
        assert_eq!(out, "the summary");
    }

    #[tokio::test]
    async fn mock_records_calls() {
        let llm = MockLlmClient::with_response("ok");
        let _ = llm.complete("sys-a", "text-a").await;
        let _ = llm.complete("sys-b", "text-b").await;

        let calls = llm.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, "sys-a");
        assert_eq!(calls[1].1, "text-b");
    }

    #[tokio::test]
    async fn failing_mock_errors() {
        let llm = MockLlmClient::failing();
        assert!(llm.complete("s", "t").await.is_err());
        assert_eq!(llm.call_count(), 1);
    }
}
