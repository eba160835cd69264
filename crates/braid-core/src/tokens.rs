//! Token counting and truncation.
//!
//! Every size-budgeted operation (chunk bounds, context packing, summary
//! accounting) goes through [`TokenCounter`] so the whole pipeline agrees on
//! one notion of "token".
//!
//! The default backend estimates from character counts using a
//! model-family ratio; English text lands within a few percent of the real
//! tokenizer, which is inside the safety margin the budgets keep. An exact
//! backend over a `tokenizer.json` file is available behind the
//! `hf-tokenizer` feature.

use serde::{Deserialize, Serialize};

use crate::text::{char_count, truncate_str};

/// Model family used to pick a chars-per-token ratio.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerFamily {
    /// GPT-4-era and Claude-era BPE vocabularies.
    Cl100kBase,
    /// Newer coarse vocabularies.
    O200kBase,
    /// SentencePiece models (Llama, Mistral, BGE).
    SentencePiece,
    /// Conservative default when the model is unknown.
    #[default]
    Heuristic,
}

impl TokenizerFamily {
    fn chars_per_token(self) -> f32 {
        match self {
            Self::Cl100kBase => 3.7,
            Self::O200kBase => 3.9,
            Self::SentencePiece => 3.3,
            Self::Heuristic => 3.5,
        }
    }
}

/// Counts and truncates text in model-token units.
pub struct TokenCounter {
    family: TokenizerFamily,
    chars_per_token: f32,
    #[cfg(feature = "hf-tokenizer")]
    exact: Option<tokenizers::Tokenizer>,
}

impl TokenCounter {
    /// Create a counter for the given model family.
    pub fn new(family: TokenizerFamily) -> Self {
        Self {
            family,
            chars_per_token: family.chars_per_token(),
            #[cfg(feature = "hf-tokenizer")]
            exact: None,
        }
    }

    /// Conservative default counter.
    pub fn heuristic() -> Self {
        Self::new(TokenizerFamily::Heuristic)
    }

    /// Load an exact tokenizer from a `tokenizer.json` file.
    ///
    /// Counting uses the real vocabulary; truncation still estimates a byte
    /// position and snaps to a char boundary.
    #[cfg(feature = "hf-tokenizer")]
    pub fn from_tokenizer_file(
        path: &std::path::Path,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let exact = tokenizers::Tokenizer::from_file(path)?;
        Ok(Self {
            family: TokenizerFamily::Heuristic,
            chars_per_token: TokenizerFamily::Heuristic.chars_per_token(),
            exact: Some(exact),
        })
    }

    /// The model family this counter was built for.
    pub fn family(&self) -> TokenizerFamily {
        self.family
    }

    /// Number of tokens in `text`. Empty text is zero tokens; any non-empty
    /// text is at least one.
    pub fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        #[cfg(feature = "hf-tokenizer")]
        if let Some(ref tok) = self.exact {
            if let Ok(encoding) = tok.encode(text, false) {
                return encoding.get_ids().len().max(1);
            }
        }
        let estimated = (char_count(text) as f32 / self.chars_per_token).ceil() as usize;
        estimated.max(1)
    }

    /// Longest prefix of `text` that fits in `max_tokens`.
    ///
    /// Returns `text` unchanged when it already fits. The cut position is
    /// estimated from the ratio and snapped to a char boundary, then to a
    /// preceding whitespace when one exists in the back half of the prefix.
    pub fn truncate<'a>(&self, text: &'a str, max_tokens: usize) -> &'a str {
        if max_tokens == 0 {
            return "";
        }
        if self.count(text) <= max_tokens {
            return text;
        }

        let max_chars = (max_tokens as f32 * self.chars_per_token) as usize;
        // Chars, not bytes: advance through real character positions.
        let byte_end = text
            .char_indices()
            .nth(max_chars)
            .map_or(text.len(), |(i, _)| i);
        let mut prefix = truncate_str(text, byte_end);

        // Prefer a word boundary unless that loses more than half the prefix.
        if let Some(last_ws) = prefix.rfind(|c: char| c.is_whitespace()) {
            if last_ws > prefix.len() / 2 {
                prefix = &prefix[..last_ws];
            }
        }
        prefix
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::heuristic()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
