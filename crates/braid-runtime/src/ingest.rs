//! Message ingestion.
//!
//! Appends messages (single or batch) and triggers the rebuild. The cache
//! is invalidated directly on every insert, independent of how the rebuild
//! goes — a failed rebuild must not leave stale cached context behind.

use std::sync::Arc;

use tracing::{info, instrument};

use braid_cache::Cache;
use braid_core::message::{Message, NewMessage};
use braid_store::{DbPool, MessageRepo, StoreError};

use crate::errors::Result;
use crate::pipeline::MutationPipeline;

/// The write-path entry point used by the HTTP layer.
pub struct IngestService {
    pool: DbPool,
    pipeline: Arc<MutationPipeline>,
    cache: Cache,
}

impl IngestService {
    /// Wire an ingest service from its collaborators.
    pub fn new(pool: DbPool, pipeline: Arc<MutationPipeline>, cache: Cache) -> Self {
        Self {
            pool,
            pipeline,
            cache,
        }
    }

    /// Append one message and rebuild the conversation's derived state.
    #[instrument(skip(self, message))]
    pub async fn append_message(
        &self,
        conversation_id: &str,
        message: &NewMessage,
    ) -> Result<Message> {
        let inserted = {
            let conn = self.pool.get().map_err(StoreError::from)?;
            MessageRepo::insert(&conn, conversation_id, message)?
        };
        self.cache.invalidate_conversation(conversation_id);

        let _ = self.pipeline.rebuild_conversation(conversation_id).await?;
        info!(conversation_id, message_id = inserted.id, "message ingested");
        Ok(inserted)
    }

    /// Append a batch in one transaction, then rebuild once.
    #[instrument(skip(self, messages))]
    pub async fn append_messages(
        &self,
        conversation_id: &str,
        messages: &[NewMessage],
    ) -> Result<Vec<Message>> {
        if messages.is_empty() {
            return Ok(Vec::new());
        }
        let inserted = {
            let mut conn = self.pool.get().map_err(StoreError::from)?;
            MessageRepo::insert_many(&mut conn, conversation_id, messages)?
        };
        self.cache.invalidate_conversation(conversation_id);

        let _ = self.pipeline.rebuild_conversation(conversation_id).await?;
        info!(
            conversation_id,
            count = inserted.len(),
            "message batch ingested"
        );
        Ok(inserted)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
