//! Connection pooling.

use std::path::Path;

use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::errors::Result;
use crate::migrations::run_migrations;

/// Pooled SQLite handle shared across request handlers.
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// Open (or create) the database file, run migrations, and build a pool.
pub fn open_pool(path: &Path) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )
    });
    let pool = r2d2::Pool::builder().build(manager)?;
    run_migrations(&*pool.get()?)?;
    info!(path = %path.display(), "database pool ready");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
