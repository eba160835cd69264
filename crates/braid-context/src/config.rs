//! Context configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Knobs for context retrieval and the services built on it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// How many chunks retrieval considers (semantic hits or recent chunks).
    pub top_k: usize,
    /// Token budget of the packed context string.
    pub max_tokens: u32,
    /// TTL for cached context, summaries, and drafts, in seconds.
    pub cache_ttl_secs: u64,
    /// Token budget for text handed to the language model.
    pub max_llm_input_tokens: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            max_tokens: 4000,
            cache_ttl_secs: 3600,
            max_llm_input_tokens: 1600,
        }
    }
}

impl ContextConfig {
    /// Cache TTL as a [`Duration`].
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}
