//! Cache key scheme.
//!
//! All keys for a conversation share the `conversation:{id}:` prefix so
//! mutation-time invalidation is one prefix delete.

/// Prefix covering every key of a conversation.
pub fn conversation_prefix(conversation_id: &str) -> String {
    format!("conversation:{conversation_id}:")
}

/// Key of the cached unscoped context.
pub fn context_key(conversation_id: &str) -> String {
    format!("conversation:{conversation_id}:context")
}

/// Key of a cached summary, optionally scoped to a query.
pub fn summary_key(conversation_id: &str, query: Option<&str>) -> String {
    match query {
        Some(q) => format!("conversation:{conversation_id}:summary:{q}"),
        None => format!("conversation:{conversation_id}:summary"),
    }
}

/// Key of a cached reply draft for one author + intent digest.
pub fn draft_key(conversation_id: &str, author: &str, intent_digest: &str) -> String {
    format!("conversation:{conversation_id}:draft:{author}:{intent_digest}")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
