//! Message repository — append-only rows in the `messages` table.

use braid_core::message::{Message, NewMessage};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::debug;

use crate::errors::Result;
use crate::repositories::{decode_ts, encode_ts};

const SELECT_COLS: &str = "id, conversation_id, author, content, timestamp, metadata";

/// Message repository — stateless, every method takes `&Connection`.
pub struct MessageRepo;

impl MessageRepo {
    /// Insert one message. A missing timestamp defaults to now.
    pub fn insert(
        conn: &Connection,
        conversation_id: &str,
        message: &NewMessage,
    ) -> Result<Message> {
        let timestamp = message.timestamp.unwrap_or_else(Utc::now);
        let metadata = message.metadata.clone().unwrap_or_default();
        let metadata_json = if metadata.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&metadata)?)
        };

        let _ = conn.execute(
            "INSERT INTO messages (conversation_id, author, content, timestamp, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                conversation_id,
                message.author,
                message.content,
                encode_ts(timestamp),
                metadata_json,
            ],
        )?;
        let id = conn.last_insert_rowid();

        Ok(Message {
            id,
            conversation_id: conversation_id.to_owned(),
            author: message.author.clone(),
            content: message.content.clone(),
            timestamp,
            metadata,
        })
    }

    /// Insert a batch in one transaction, preserving order.
    pub fn insert_many(
        conn: &mut Connection,
        conversation_id: &str,
        messages: &[NewMessage],
    ) -> Result<Vec<Message>> {
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(messages.len());
        for message in messages {
            inserted.push(Self::insert(&tx, conversation_id, message)?);
        }
        tx.commit()?;
        debug!(
            conversation_id,
            count = inserted.len(),
            "messages inserted"
        );
        Ok(inserted)
    }

    /// Get a message by id.
    pub fn get(conn: &Connection, id: i64) -> Result<Option<Message>> {
        let row = conn
            .query_row(
                &format!("SELECT {SELECT_COLS} FROM messages WHERE id = ?1"),
                params![id],
                map_message,
            )
            .optional()?;
        Ok(row)
    }

    /// All messages of a conversation, oldest first.
    pub fn list_all(conn: &Connection, conversation_id: &str) -> Result<Vec<Message>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM messages
             WHERE conversation_id = ?1
             ORDER BY timestamp ASC, id ASC"
        ))?;
        let rows = stmt
            .query_map(params![conversation_id], map_message)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// A page of messages, oldest first.
    pub fn list(
        conn: &Connection,
        conversation_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Message>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM messages
             WHERE conversation_id = ?1
             ORDER BY timestamp ASC, id ASC
             LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
            .query_map(params![conversation_id, limit, offset], map_message)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Message count for a conversation.
    pub fn count(conn: &Connection, conversation_id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM messages WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Distinct conversation ids, most recently active first.
    pub fn conversation_ids(conn: &Connection) -> Result<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT conversation_id FROM messages
             GROUP BY conversation_id
             ORDER BY MAX(timestamp) DESC",
        )?;
        let rows = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn map_message(row: &Row<'_>) -> rusqlite::Result<Message> {
    let ts_raw: String = row.get(4)?;
    let metadata_raw: Option<String> = row.get(5)?;
    let metadata = match metadata_raw {
        Some(raw) => serde_json::from_str(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        None => serde_json::Map::new(),
    };
    Ok(Message {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        author: row.get(2)?,
        content: row.get(3)?,
        timestamp: decode_ts(&ts_raw, 4)?,
        metadata,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
