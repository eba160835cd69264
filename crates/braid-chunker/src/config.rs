//! Chunker configuration.

use serde::{Deserialize, Serialize};

/// Bounds for a chunking pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkerConfig {
    /// Token cap per chunk.
    ///
    /// Soft ceiling: a single message whose content alone exceeds the cap
    /// still becomes its own chunk — messages are never split mid-content.
    pub max_chunk_tokens: u32,
    /// Message-count cap per chunk.
    pub max_chunk_messages: u32,
    /// How many trailing messages of a closed chunk seed the next one.
    ///
    /// Must be smaller than `max_chunk_messages` for the message cap to
    /// hold; [`ChunkerConfig::clamped`] enforces this.
    pub overlap_messages: u32,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: 1000,
            max_chunk_messages: 50,
            overlap_messages: 2,
        }
    }
}

impl ChunkerConfig {
    /// Copy of `self` with degenerate values repaired: zero caps are raised
    /// to one, and the overlap is clamped below the message cap.
    pub fn clamped(self) -> Self {
        let max_chunk_tokens = self.max_chunk_tokens.max(1);
        let max_chunk_messages = self.max_chunk_messages.max(1);
        let overlap_messages = self
            .overlap_messages
            .min(max_chunk_messages.saturating_sub(1));
        Self {
            max_chunk_tokens,
            max_chunk_messages,
            overlap_messages,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
