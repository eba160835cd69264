//! Schema migrations.
//!
//! Run once at startup; a failure here is fatal and aborts boot — the one
//! place the system prefers a hard stop over degradation.

use rusqlite::Connection;
use tracing::info;

use crate::errors::Result;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT    NOT NULL,
    author          TEXT    NOT NULL,
    content         TEXT    NOT NULL,
    timestamp       TEXT    NOT NULL,
    metadata        TEXT
);
CREATE INDEX IF NOT EXISTS idx_messages_conversation_time
    ON messages(conversation_id, timestamp);

CREATE TABLE IF NOT EXISTS chunks (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT    NOT NULL,
    chunk_index     INTEGER NOT NULL,
    content         TEXT    NOT NULL,
    embedding_ref   TEXT,
    start_time      TEXT    NOT NULL,
    end_time        TEXT    NOT NULL,
    token_count     INTEGER NOT NULL,
    message_count   INTEGER NOT NULL,
    authors         TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_chunks_conversation_end
    ON chunks(conversation_id, end_time);

CREATE TABLE IF NOT EXISTS summaries (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id TEXT    NOT NULL,
    content         TEXT    NOT NULL,
    created_at      TEXT    NOT NULL,
    chunk_ids       TEXT    NOT NULL,
    is_full_summary INTEGER NOT NULL DEFAULT 0,
    token_count     INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_summaries_conversation_created
    ON summaries(conversation_id, created_at);
";

/// Create tables and indices if they do not exist.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    info!("database schema ready");
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
