//! Summary repository — append-only rows, most recent wins.

use braid_core::summary::Summary;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::errors::Result;
use crate::repositories::{decode_ts, encode_ts};

const SELECT_COLS: &str =
    "id, conversation_id, content, created_at, chunk_ids, is_full_summary, token_count";

/// Summary repository — stateless, every method takes `&Connection`.
pub struct SummaryRepo;

impl SummaryRepo {
    /// Append a summary row.
    pub fn insert(
        conn: &Connection,
        conversation_id: &str,
        content: &str,
        chunk_ids: &[i64],
        is_full_summary: bool,
        token_count: u32,
    ) -> Result<Summary> {
        let created_at = Utc::now();
        let chunk_ids_json = serde_json::to_string(chunk_ids)?;
        let _ = conn.execute(
            "INSERT INTO summaries (conversation_id, content, created_at, chunk_ids,
                                    is_full_summary, token_count)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                conversation_id,
                content,
                encode_ts(created_at),
                chunk_ids_json,
                is_full_summary,
                token_count,
            ],
        )?;
        Ok(Summary {
            id: conn.last_insert_rowid(),
            conversation_id: conversation_id.to_owned(),
            content: content.to_owned(),
            created_at,
            chunk_ids: chunk_ids.to_vec(),
            is_full_summary,
            token_count,
        })
    }

    /// The most recent full (unscoped) summary of a conversation.
    pub fn latest_full(conn: &Connection, conversation_id: &str) -> Result<Option<Summary>> {
        let row = conn
            .query_row(
                &format!(
                    "SELECT {SELECT_COLS} FROM summaries
                     WHERE conversation_id = ?1 AND is_full_summary = 1
                     ORDER BY created_at DESC, id DESC
                     LIMIT 1"
                ),
                params![conversation_id],
                map_summary,
            )
            .optional()?;
        Ok(row)
    }

    /// Summary count for a conversation.
    pub fn count(conn: &Connection, conversation_id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM summaries WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_summary(row: &Row<'_>) -> rusqlite::Result<Summary> {
    let created_raw: String = row.get(3)?;
    let chunk_ids_raw: String = row.get(4)?;
    let chunk_ids = serde_json::from_str(&chunk_ids_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Summary {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        content: row.get(2)?,
        created_at: decode_ts(&created_raw, 3)?,
        chunk_ids,
        is_full_summary: row.get(5)?,
        token_count: row.get(6)?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_and_fetch_latest() {
        let conn = setup();
        let summary =
            SummaryRepo::insert(&conn, "conv_a", "what happened", &[1, 2], true, 8).unwrap();
        assert!(summary.id > 0);

        let latest = SummaryRepo::latest_full(&conn, "conv_a").unwrap().unwrap();
        assert_eq!(latest.content, "what happened");
        assert_eq!(latest.chunk_ids, vec![1, 2]);
        assert!(latest.is_full_summary);
    }

    #[test]
    fn latest_full_prefers_newest_row() {
        let conn = setup();
        SummaryRepo::insert(&conn, "conv_a", "older", &[], true, 2).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        SummaryRepo::insert(&conn, "conv_a", "newer", &[], true, 2).unwrap();

        let latest = SummaryRepo::latest_full(&conn, "conv_a").unwrap().unwrap();
        assert_eq!(latest.content, "newer");
        assert_eq!(SummaryRepo::count(&conn, "conv_a").unwrap(), 2);
    }

    #[test]
    fn latest_full_ignores_scoped_rows() {
        let conn = setup();
        SummaryRepo::insert(&conn, "conv_a", "scoped", &[], false, 2).unwrap();
        assert!(SummaryRepo::latest_full(&conn, "conv_a").unwrap().is_none());
    }

    #[test]
    fn latest_full_missing_conversation_is_none() {
        let conn = setup();
        assert!(SummaryRepo::latest_full(&conn, "conv_x").unwrap().is_none());
    }
}
