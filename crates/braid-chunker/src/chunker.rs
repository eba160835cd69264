//! The chunking pass.
//!
//! Accumulates timestamp-ordered messages into a running buffer. Before a
//! message is added, the buffer is closed into a chunk if appending would
//! push it past the token cap, or if it already holds the message cap. A
//! closed buffer seeds the next one with its last `overlap_messages`
//! entries, whose token count and author set are recomputed from scratch.
//! The pending message is always added afterward, so a single message that
//! alone exceeds the token cap still lands in its own chunk.

use std::collections::BTreeSet;

use braid_core::chunk::ChunkDraft;
use braid_core::message::Message;
use braid_core::tokens::TokenCounter;
use tracing::debug;

use crate::config::ChunkerConfig;

/// Split `messages` (sorted by timestamp ascending) into chunks.
///
/// Every message's content appears in at least one chunk; adjacent chunks
/// share `overlap_messages` messages. Chunk indices are dense from 0 in
/// emission order. Empty input yields no chunks.
pub fn chunk_messages(
    messages: &[Message],
    conversation_id: &str,
    counter: &TokenCounter,
    config: &ChunkerConfig,
) -> Vec<ChunkDraft> {
    if messages.is_empty() {
        return Vec::new();
    }
    let config = config.clamped();

    let mut chunks = Vec::new();
    let mut buffer: Vec<&Message> = Vec::new();
    let mut buffer_tokens: usize = 0;
    let mut authors: BTreeSet<&str> = BTreeSet::new();
    let mut chunk_index: u32 = 0;

    for message in messages {
        let message_tokens = counter.count(&message.content);

        let over_tokens = buffer_tokens + message_tokens > config.max_chunk_tokens as usize;
        let over_messages = buffer.len() >= config.max_chunk_messages as usize;
        if (over_tokens || over_messages) && !buffer.is_empty() {
            chunks.push(render_chunk(
                &buffer,
                conversation_id,
                chunk_index,
                buffer_tokens,
                &authors,
            ));
            chunk_index += 1;

            // Seed the next buffer with the tail of the one just closed and
            // recompute its token count and author set.
            let overlap_start = buffer.len().saturating_sub(config.overlap_messages as usize);
            buffer.drain(..overlap_start);
            buffer_tokens = buffer.iter().map(|m| counter.count(&m.content)).sum();
            authors = buffer.iter().map(|m| m.author.as_str()).collect();
        }

        buffer.push(message);
        buffer_tokens += message_tokens;
        let _ = authors.insert(message.author.as_str());
    }

    if !buffer.is_empty() {
        chunks.push(render_chunk(
            &buffer,
            conversation_id,
            chunk_index,
            buffer_tokens,
            &authors,
        ));
    }

    debug!(
        conversation_id,
        message_count = messages.len(),
        chunk_count = chunks.len(),
        "chunked conversation"
    );
    chunks
}

/// Render a non-empty buffer into a chunk draft.
fn render_chunk(
    buffer: &[&Message],
    conversation_id: &str,
    chunk_index: u32,
    token_count: usize,
    authors: &BTreeSet<&str>,
) -> ChunkDraft {
    let content = buffer
        .iter()
        .map(|m| format!("{}: {}", m.author, m.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    // Input is timestamp-ordered, but min/max keeps the bounds honest even
    // for equal timestamps.
    let start_time = buffer.iter().map(|m| m.timestamp).min().expect("non-empty");
    let end_time = buffer.iter().map(|m| m.timestamp).max().expect("non-empty");

    ChunkDraft {
        conversation_id: conversation_id.to_owned(),
        chunk_index,
        content,
        start_time,
        end_time,
        token_count: token_count as u32,
        message_count: buffer.len() as u32,
        authors: authors.iter().map(|a| (*a).to_owned()).collect(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
