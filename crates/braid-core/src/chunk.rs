//! Chunk records — bounded groups of messages used as retrieval units.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted chunk: a contiguous run of messages rendered to one string.
///
/// Chunks are disposable. Every mutation of the owning conversation deletes
/// all of its chunks and rebuilds them from scratch, so chunk identity is
/// not stable across mutations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning conversation.
    pub conversation_id: String,
    /// Zero-based position within the current chunking pass.
    pub chunk_index: u32,
    /// Concatenated `"author: content"` blocks, blank-line separated.
    pub content: String,
    /// Position in the conversation's vector index, once embedded.
    pub embedding_ref: Option<String>,
    /// Timestamp of the earliest constituent message.
    pub start_time: DateTime<Utc>,
    /// Timestamp of the latest constituent message.
    pub end_time: DateTime<Utc>,
    /// Token count of `content`.
    pub token_count: u32,
    /// Number of constituent messages.
    pub message_count: u32,
    /// Distinct authors across constituent messages (order irrelevant).
    pub authors: Vec<String>,
}

/// A chunk as produced by the chunker, before the store assigns an id.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkDraft {
    /// Owning conversation.
    pub conversation_id: String,
    /// Zero-based position within this chunking pass.
    pub chunk_index: u32,
    /// Rendered chunk content.
    pub content: String,
    /// Timestamp of the earliest constituent message.
    pub start_time: DateTime<Utc>,
    /// Timestamp of the latest constituent message.
    pub end_time: DateTime<Utc>,
    /// Token count of `content`.
    pub token_count: u32,
    /// Number of constituent messages.
    pub message_count: u32,
    /// Distinct authors.
    pub authors: Vec<String>,
}
