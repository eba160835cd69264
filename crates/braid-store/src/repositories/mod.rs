//! Stateless repositories over `&Connection`.

pub mod chunk;
pub mod message;
pub mod summary;

use chrono::{DateTime, SecondsFormat, Utc};

/// Render a timestamp for storage.
///
/// Fixed microsecond precision keeps the TEXT column lexicographically
/// ordered, which the conversation/time indices rely on.
pub(crate) fn encode_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp inside a rusqlite row mapper.
pub(crate) fn decode_ts(raw: &str, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
