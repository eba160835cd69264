//! Message records — the immutable unit of conversation history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A persisted chat message.
///
/// Messages belong to exactly one conversation and are immutable once
/// created; all derived state (chunks, embeddings, summaries) is rebuilt
/// from the full ordered message set by the mutation pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning conversation.
    pub conversation_id: String,
    /// Display name of the sender.
    pub author: String,
    /// Message body.
    pub content: String,
    /// When the message was sent (defaults to ingestion time).
    pub timestamp: DateTime<Utc>,
    /// Free-form metadata supplied at ingestion.
    #[serde(default)]
    pub metadata: serde_json::Map<String, Value>,
}

/// Input form of a message, before the store assigns an id.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NewMessage {
    /// Display name of the sender.
    pub author: String,
    /// Message body.
    pub content: String,
    /// Optional explicit timestamp; ingestion time when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, Value>>,
}

impl NewMessage {
    /// Convenience constructor for the common author + content case.
    pub fn new(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            timestamp: None,
            metadata: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_serde_roundtrip() {
        let msg = Message {
            id: 7,
            conversation_id: "conv_1".into(),
            author: "ada".into(),
            content: "hello".into(),
            timestamp: Utc::now(),
            metadata: serde_json::Map::new(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, back);
    }

    #[test]
    fn new_message_defaults() {
        let msg = NewMessage::new("ada", "hi");
        assert!(msg.timestamp.is_none());
        assert!(msg.metadata.is_none());
    }

    #[test]
    fn new_message_minimal_json() {
        let msg: NewMessage =
            serde_json::from_value(json!({"author": "ada", "content": "hi"})).unwrap();
        assert_eq!(msg.author, "ada");
        assert!(msg.timestamp.is_none());
    }
}
