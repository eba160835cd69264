//! Summary records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted conversation summary.
///
/// Only unscoped (full chronological) summaries are persisted; query-scoped
/// summaries live in the cache only. Rows are append-only — recomputing a
/// summary inserts a new row and the most recent row is treated as current.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Row id assigned by the store.
    pub id: i64,
    /// Owning conversation.
    pub conversation_id: String,
    /// Summary text.
    pub content: String,
    /// When this row was computed.
    pub created_at: DateTime<Utc>,
    /// Chunks that contributed to this summary.
    pub chunk_ids: Vec<i64>,
    /// Whether this is the unscoped full chronological summary.
    pub is_full_summary: bool,
    /// Token count of `content`.
    pub token_count: u32,
}
