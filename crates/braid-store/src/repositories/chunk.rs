//! Chunk repository — disposable rows, bulk-replaced on every conversation
//! mutation.

use braid_core::chunk::{Chunk, ChunkDraft};
use rusqlite::{Connection, Row, params};
use tracing::debug;

use crate::errors::Result;
use crate::repositories::{decode_ts, encode_ts};

const SELECT_COLS: &str = "id, conversation_id, chunk_index, content, embedding_ref, \
                           start_time, end_time, token_count, message_count, authors";

/// Chunk repository — stateless, every method takes `&Connection`.
pub struct ChunkRepo;

impl ChunkRepo {
    /// Insert a chunking pass in one transaction, returning rows with ids.
    pub fn insert_many(conn: &mut Connection, drafts: &[ChunkDraft]) -> Result<Vec<Chunk>> {
        let tx = conn.transaction()?;
        let mut inserted = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let authors_json = serde_json::to_string(&draft.authors)?;
            let _ = tx.execute(
                "INSERT INTO chunks (conversation_id, chunk_index, content, embedding_ref,
                                     start_time, end_time, token_count, message_count, authors)
                 VALUES (?1, ?2, ?3, NULL, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.conversation_id,
                    draft.chunk_index,
                    draft.content,
                    encode_ts(draft.start_time),
                    encode_ts(draft.end_time),
                    draft.token_count,
                    draft.message_count,
                    authors_json,
                ],
            )?;
            inserted.push(Chunk {
                id: tx.last_insert_rowid(),
                conversation_id: draft.conversation_id.clone(),
                chunk_index: draft.chunk_index,
                content: draft.content.clone(),
                embedding_ref: None,
                start_time: draft.start_time,
                end_time: draft.end_time,
                token_count: draft.token_count,
                message_count: draft.message_count,
                authors: draft.authors.clone(),
            });
        }
        tx.commit()?;
        debug!(count = inserted.len(), "chunks inserted");
        Ok(inserted)
    }

    /// Delete every chunk of a conversation. Returns how many went away.
    pub fn delete_by_conversation(conn: &Connection, conversation_id: &str) -> Result<usize> {
        let deleted = conn.execute(
            "DELETE FROM chunks WHERE conversation_id = ?1",
            params![conversation_id],
        )?;
        Ok(deleted)
    }

    /// Fetch specific chunks of a conversation by id.
    pub fn get_many(conn: &Connection, ids: &[i64], conversation_id: &str) -> Result<Vec<Chunk>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {SELECT_COLS} FROM chunks
             WHERE conversation_id = ? AND id IN ({placeholders})"
        );
        let mut stmt = conn.prepare(&sql)?;

        let mut bindings: Vec<&dyn rusqlite::ToSql> = vec![&conversation_id];
        for id in ids {
            bindings.push(id);
        }
        let rows = stmt
            .query_map(bindings.as_slice(), map_chunk)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// The most recent `limit` chunks of a conversation, newest end-time
    /// first.
    pub fn recent(conn: &Connection, conversation_id: &str, limit: i64) -> Result<Vec<Chunk>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {SELECT_COLS} FROM chunks
             WHERE conversation_id = ?1
             ORDER BY end_time DESC, chunk_index DESC
             LIMIT ?2"
        ))?;
        let rows = stmt
            .query_map(params![conversation_id, limit], map_chunk)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Record the vector-index position a chunk was embedded at.
    pub fn set_embedding_ref(conn: &Connection, id: i64, embedding_ref: &str) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE chunks SET embedding_ref = ?1 WHERE id = ?2",
            params![embedding_ref, id],
        )?;
        Ok(changed > 0)
    }

    /// Chunk count for a conversation.
    pub fn count(conn: &Connection, conversation_id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE conversation_id = ?1",
            params![conversation_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_chunk(row: &Row<'_>) -> rusqlite::Result<Chunk> {
    let start_raw: String = row.get(5)?;
    let end_raw: String = row.get(6)?;
    let authors_raw: String = row.get(9)?;
    let authors = serde_json::from_str(&authors_raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Chunk {
        id: row.get(0)?,
        conversation_id: row.get(1)?,
        chunk_index: row.get(2)?,
        content: row.get(3)?,
        embedding_ref: row.get(4)?,
        start_time: decode_ts(&start_raw, 5)?,
        end_time: decode_ts(&end_raw, 6)?,
        token_count: row.get(7)?,
        message_count: row.get(8)?,
        authors,
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
    use chrono::{Duration, TimeZone, Utc};

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn draft(conversation_id: &str, index: u32, offset_secs: i64) -> ChunkDraft {
        let base = Utc.with_ymd_and_hms(2026, 2, 1, 10, 0, 0).unwrap();
        ChunkDraft {
            conversation_id: conversation_id.to_owned(),
            chunk_index: index,
            content: format!("ada: chunk body {index}"),
            start_time: base + Duration::seconds(offset_secs),
            end_time: base + Duration::seconds(offset_secs + 30),
            token_count: 12,
            message_count: 3,
            authors: vec!["ada".into(), "bob".into()],
        }
    }

    #[test]
    fn insert_many_returns_rows_with_ids() {
        let mut conn = setup();
        let drafts = vec![draft("conv_a", 0, 0), draft("conv_a", 1, 60)];
        let chunks = ChunkRepo::insert_many(&mut conn, &drafts).unwrap();

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].id > 0);
        assert_ne!(chunks[0].id, chunks[1].id);
        assert_eq!(chunks[0].embedding_ref, None);
        assert_eq!(chunks[1].chunk_index, 1);
    }

    #[test]
    fn insert_empty_slice_is_noop() {
        let mut conn = setup();
        let chunks = ChunkRepo::insert_many(&mut conn, &[]).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn authors_roundtrip() {
        let mut conn = setup();
        let chunks = ChunkRepo::insert_many(&mut conn, &[draft("conv_a", 0, 0)]).unwrap();
        let fetched = ChunkRepo::get_many(&conn, &[chunks[0].id], "conv_a").unwrap();
        assert_eq!(fetched[0].authors, vec!["ada", "bob"]);
        assert_eq!(fetched[0].start_time, chunks[0].start_time);
    }

    #[test]
    fn delete_by_conversation_is_scoped() {
        let mut conn = setup();
        ChunkRepo::insert_many(&mut conn, &[draft("conv_a", 0, 0), draft("conv_a", 1, 60)])
            .unwrap();
        ChunkRepo::insert_many(&mut conn, &[draft("conv_b", 0, 0)]).unwrap();

        let deleted = ChunkRepo::delete_by_conversation(&conn, "conv_a").unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(ChunkRepo::count(&conn, "conv_a").unwrap(), 0);
        assert_eq!(ChunkRepo::count(&conn, "conv_b").unwrap(), 1);
    }

    #[test]
    fn get_many_ignores_other_conversations() {
        let mut conn = setup();
        let a = ChunkRepo::insert_many(&mut conn, &[draft("conv_a", 0, 0)]).unwrap();
        let b = ChunkRepo::insert_many(&mut conn, &[draft("conv_b", 0, 0)]).unwrap();

        let fetched = ChunkRepo::get_many(&conn, &[a[0].id, b[0].id], "conv_a").unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, a[0].id);
    }

    #[test]
    fn get_many_empty_ids() {
        let conn = setup();
        assert!(ChunkRepo::get_many(&conn, &[], "conv_a").unwrap().is_empty());
    }

    #[test]
    fn recent_orders_by_end_time_desc() {
        let mut conn = setup();
        ChunkRepo::insert_many(
            &mut conn,
            &[
                draft("conv_a", 0, 0),
                draft("conv_a", 1, 60),
                draft("conv_a", 2, 120),
            ],
        )
        .unwrap();

        let recent = ChunkRepo::recent(&conn, "conv_a", 2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].chunk_index, 2);
        assert_eq!(recent[1].chunk_index, 1);
    }

    #[test]
    fn set_embedding_ref_updates_row() {
        let mut conn = setup();
        let chunks = ChunkRepo::insert_many(&mut conn, &[draft("conv_a", 0, 0)]).unwrap();

        assert!(ChunkRepo::set_embedding_ref(&conn, chunks[0].id, "0").unwrap());
        let fetched = ChunkRepo::get_many(&conn, &[chunks[0].id], "conv_a").unwrap();
        assert_eq!(fetched[0].embedding_ref.as_deref(), Some("0"));
    }

    #[test]
    fn set_embedding_ref_missing_row_is_false() {
        let conn = setup();
        assert!(!ChunkRepo::set_embedding_ref(&conn, 12345, "0").unwrap());
    }
}
