//! The conversation mutation pipeline.
//!
//! Chunks are derived state, rebuilt wholesale after every mutation:
//!
//! 1. load all messages, timestamp-ordered
//! 2. nothing there -> abort (no chunks to build)
//! 3. delete every existing chunk of the conversation
//! 4. run the chunker; an empty result aborts
//! 5. persist the new chunks, obtaining durable ids
//! 6. embed each chunk and index the non-empty vectors, writing the index
//!    position back onto the chunk row
//! 7. invalidate the conversation's cache
//!
//! Step 6 is per-chunk best-effort: one chunk failing to embed must not
//! block the others or abort the rebuild. Two rebuilds of the same
//! conversation racing on delete+rebuild would corrupt the chunk set, so
//! the whole pipeline runs under a per-conversation lock; rebuilds of
//! different conversations never contend.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use braid_cache::Cache;
use braid_chunker::{ChunkerConfig, chunk_messages};
use braid_core::tokens::TokenCounter;
use braid_embeddings::EmbeddingService;
use braid_index::VectorStore;
use braid_store::{ChunkRepo, DbPool, MessageRepo, StoreError};

use crate::errors::Result;

/// What a rebuild did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebuildOutcome {
    /// Chunks were rebuilt; `embedded` of `chunks` got index entries.
    Rebuilt {
        /// Chunks persisted.
        chunks: usize,
        /// Chunks that received an embedding and index position.
        embedded: usize,
    },
    /// The conversation has no messages; nothing to build.
    Empty,
}

/// Rebuilds a conversation's derived state after mutation.
pub struct MutationPipeline {
    pool: DbPool,
    index: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingService>,
    cache: Cache,
    counter: Arc<TokenCounter>,
    chunker_config: ChunkerConfig,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl MutationPipeline {
    /// Wire a pipeline from its collaborators.
    pub fn new(
        pool: DbPool,
        index: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingService>,
        cache: Cache,
        counter: Arc<TokenCounter>,
        chunker_config: ChunkerConfig,
    ) -> Self {
        Self {
            pool,
            index,
            embedder,
            cache,
            counter,
            chunker_config,
            locks: DashMap::new(),
        }
    }

    /// Rebuild chunks, embeddings, and index entries for a conversation.
    #[instrument(skip(self))]
    pub async fn rebuild_conversation(&self, conversation_id: &str) -> Result<RebuildOutcome> {
        let lock = self.lock_for(conversation_id);
        let _guard = lock.lock().await;

        // 1-2: load the full ordered message set
        let messages = {
            let conn = self.pool.get().map_err(StoreError::from)?;
            MessageRepo::list_all(&conn, conversation_id)?
        };
        if messages.is_empty() {
            warn!(conversation_id, "no messages, skipping rebuild");
            return Ok(RebuildOutcome::Empty);
        }

        // 3: full replace — old chunk rows go away first
        {
            let conn = self.pool.get().map_err(StoreError::from)?;
            let deleted = ChunkRepo::delete_by_conversation(&conn, conversation_id)?;
            if deleted > 0 {
                info!(conversation_id, deleted, "previous chunks dropped");
            }
        }
        self.index.delete_conversation(conversation_id);

        // 4: rechunk
        let drafts = chunk_messages(
            &messages,
            conversation_id,
            &self.counter,
            &self.chunker_config,
        );
        if drafts.is_empty() {
            warn!(conversation_id, "chunker produced nothing, skipping rebuild");
            return Ok(RebuildOutcome::Empty);
        }

        // 5: persist
        let chunks = {
            let mut conn = self.pool.get().map_err(StoreError::from)?;
            ChunkRepo::insert_many(&mut conn, &drafts)?
        };

        // 6: embed + index, per-chunk best-effort
        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await;

        let mut embedded = 0usize;
        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            if embedding.is_empty() {
                warn!(conversation_id, chunk_id = chunk.id, "chunk has no embedding");
                continue;
            }
            let Some(position) = self
                .index
                .add_embedding(embedding, conversation_id, chunk.id)
            else {
                continue;
            };
            let conn = self.pool.get().map_err(StoreError::from)?;
            if ChunkRepo::set_embedding_ref(&conn, chunk.id, &position.to_string())? {
                embedded += 1;
            }
        }

        // 7: whatever was cached for this conversation is now stale
        self.cache.invalidate_conversation(conversation_id);

        info!(
            conversation_id,
            chunks = chunks.len(),
            embedded,
            "conversation rebuilt"
        );
        Ok(RebuildOutcome::Rebuilt {
            chunks: chunks.len(),
            embedded,
        })
    }

    fn lock_for(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        self.locks
            .entry(conversation_id.to_owned())
            .or_default()
            .clone()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
