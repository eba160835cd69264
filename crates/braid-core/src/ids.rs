//! Conversation id minting and validation.
//!
//! Conversation ids are caller-visible strings. Ids minted here follow the
//! `conv_<uuidv7>` shape so they sort roughly by creation time, but any
//! non-empty string without path separators is accepted from callers (ids
//! become file stems in the vector index directory).

use uuid::Uuid;

/// Mint a new conversation id (`conv_<uuidv7>`).
pub fn new_conversation_id() -> String {
    format!("conv_{}", Uuid::now_v7())
}

/// Whether a caller-supplied conversation id is safe to use.
///
/// Rejects empty ids and ids containing path separators or NUL, since
/// conversation ids name files under the index directory.
pub fn is_valid_conversation_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && !id.contains(['/', '\\', '\0'])
        && id != "."
        && id != ".."
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
