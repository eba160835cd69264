//! Context assembly.
//!
//! Retrieval has three tiers: the cached context (unscoped requests only),
//! semantic search when a query is present, and chronological recency
//! otherwise. Both computed paths pack chunk contents greedily against a
//! token budget and stop at the first chunk that would overflow — no
//! skipping ahead to a smaller one, so the output stays in rank/time order.

use std::sync::Arc;

use braid_core::chunk::Chunk;
use braid_index::{SearchHit, VectorStore};
use tracing::{debug, info, instrument, warn};

use braid_cache::{Cache, keys};
use braid_embeddings::EmbeddingService;
use braid_store::{ChunkRepo, DbPool, StoreError};

use crate::config::ContextConfig;
use crate::errors::Result;

/// Separator between packed chunk contents.
pub const CONTEXT_SEPARATOR: &str = "\n\n==========\n\n";

/// Builds the packed context string for a conversation.
pub struct ContextAssembler {
    pool: DbPool,
    index: Arc<VectorStore>,
    embedder: Arc<dyn EmbeddingService>,
    cache: Cache,
    config: ContextConfig,
}

impl ContextAssembler {
    /// Wire an assembler from its collaborators.
    pub fn new(
        pool: DbPool,
        index: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingService>,
        cache: Cache,
        config: ContextConfig,
    ) -> Self {
        Self {
            pool,
            index,
            embedder,
            cache,
            config,
        }
    }

    /// Retrieval knobs in use.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Get conversation context, optionally focused by `query`.
    ///
    /// An empty string means the conversation has no chunks yet — a "no
    /// data" signal, not an error. Semantic retrieval degrades to
    /// chronological on any internal failure.
    #[instrument(skip(self))]
    pub async fn get_context(
        &self,
        conversation_id: &str,
        query: Option<&str>,
        use_cache: bool,
    ) -> Result<String> {
        let cache_key = keys::context_key(conversation_id);
        if use_cache && query.is_none() {
            if let Some(cached) = self.cache.get(&cache_key) {
                info!(conversation_id, "context served from cache");
                return Ok(cached);
            }
        }

        let context = match query {
            Some(q) => match self.semantic_context(conversation_id, q).await {
                Ok(context) => context,
                Err(e) => {
                    warn!(conversation_id, error = %e, "semantic retrieval failed, falling back");
                    self.chronological_context(conversation_id)?
                }
            },
            None => self.chronological_context(conversation_id)?,
        };

        if use_cache && query.is_none() {
            self.cache
                .set(&cache_key, &context, Some(self.config.cache_ttl()));
        }
        Ok(context)
    }

    /// Semantic retrieval: vector hits packed in relevance order, each part
    /// annotated with its score. No hits falls back to chronological.
    async fn semantic_context(&self, conversation_id: &str, query: &str) -> Result<String> {
        let hits = self
            .index
            .search_by_text(
                self.embedder.as_ref(),
                query,
                conversation_id,
                self.config.top_k,
            )
            .await;

        if hits.is_empty() {
            debug!(conversation_id, query, "no semantic hits, using recency");
            return self.chronological_context(conversation_id);
        }

        let conn = self.pool.get().map_err(StoreError::from)?;
        let ids: Vec<i64> = hits.iter().map(|h| h.chunk_id).collect();
        let chunks = ChunkRepo::get_many(&conn, &ids, conversation_id)?;

        let mut ranked: Vec<(Chunk, f32)> = chunks
            .into_iter()
            .map(|chunk| {
                let score = score_for(&hits, chunk.id);
                (chunk, score)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let parts = pack_greedy(
            ranked
                .iter()
                .map(|(chunk, score)| (format!("[Relevance: {score:.2}] {}", chunk.content), chunk.token_count)),
            self.config.max_tokens,
        );
        Ok(parts.join(CONTEXT_SEPARATOR))
    }

    /// Chronological retrieval: the most recent chunks, replayed oldest
    /// first.
    fn chronological_context(&self, conversation_id: &str) -> Result<String> {
        let conn = self.pool.get().map_err(StoreError::from)?;
        let mut chunks = ChunkRepo::recent(&conn, conversation_id, self.config.top_k as i64)?;
        if chunks.is_empty() {
            debug!(conversation_id, "no chunks for conversation");
            return Ok(String::new());
        }
        chunks.sort_by_key(|c| c.start_time);

        let parts = pack_greedy(
            chunks
                .iter()
                .map(|chunk| (chunk.content.clone(), chunk.token_count)),
            self.config.max_tokens,
        );
        Ok(parts.join(CONTEXT_SEPARATOR))
    }

    /// The chunk ids chronological retrieval would draw from right now.
    ///
    /// The summarizer records these on persisted summary rows.
    pub fn recent_chunk_ids(&self, conversation_id: &str) -> Result<Vec<i64>> {
        let conn = self.pool.get().map_err(StoreError::from)?;
        let chunks = ChunkRepo::recent(&conn, conversation_id, self.config.top_k as i64)?;
        Ok(chunks.into_iter().map(|c| c.id).collect())
    }
}

fn score_for(hits: &[SearchHit], chunk_id: i64) -> f32 {
    hits.iter()
        .find(|h| h.chunk_id == chunk_id)
        .map_or(0.0, |h| h.score)
}

/// Pack parts until the running token total would cross `max_tokens`.
///
/// Stops at the first overflowing part even if a later, smaller one would
/// still fit.
fn pack_greedy(parts: impl Iterator<Item = (String, u32)>, max_tokens: u32) -> Vec<String> {
    let mut packed = Vec::new();
    let mut total: u64 = 0;
    for (content, tokens) in parts {
        if total + u64::from(tokens) > u64::from(max_tokens) {
            break;
        }
        total += u64::from(tokens);
        packed.push(content);
    }
    packed
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
