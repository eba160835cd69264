//! Application state.
//!
//! Every service is constructed once here and injected downward — no
//! global singletons, so tests can swap any collaborator for a fake.

use std::sync::Arc;

use anyhow::Context as _;

use braid_cache::{Cache, CacheStore, MemoryStore};
use braid_context::{ContextAssembler, Drafter, LlmClient, MockLlmClient, Summarizer};
use braid_core::tokens::TokenCounter;
use braid_embeddings::{EmbeddingService, HttpEmbeddingService, MockEmbeddingService};
use braid_index::VectorStore;
use braid_runtime::{IngestService, MutationPipeline};
use braid_store::{DbPool, open_pool};

use crate::config::AppConfig;
use crate::llm_http::{HttpLlmClient, LlmConfig};

/// Shared state behind every route handler.
#[derive(Clone)]
pub struct AppState {
    /// Pooled database handle.
    pub pool: DbPool,
    /// Write path.
    pub ingest: Arc<IngestService>,
    /// Read path.
    pub assembler: Arc<ContextAssembler>,
    /// Summaries.
    pub summarizer: Arc<Summarizer>,
    /// Reply drafts.
    pub drafter: Arc<Drafter>,
}

impl AppState {
    /// Build the full service graph from configuration.
    ///
    /// Fails hard on anything boot-critical: an unopenable database or
    /// index directory aborts startup.
    pub fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = open_pool(&config.db_path)
            .with_context(|| format!("opening database at {}", config.db_path.display()))?;

        let index = Arc::new(
            VectorStore::new(config.index_config())
                .with_context(|| format!("opening index dir {}", config.index_dir.display()))?,
        );

        let embedder: Arc<dyn EmbeddingService> = if config.offline {
            Arc::new(MockEmbeddingService::new(config.embedding_dimensions))
        } else {
            Arc::new(
                HttpEmbeddingService::new(config.embedding_config())
                    .context("building embedding client")?,
            )
        };

        let llm: Arc<dyn LlmClient> = if config.offline {
            Arc::new(MockLlmClient::default())
        } else {
            Arc::new(
                HttpLlmClient::new(LlmConfig {
                    endpoint: config.llm_endpoint.clone(),
                    model: config.llm_model.clone(),
                    api_key: config.llm_api_key.clone(),
                    ..LlmConfig::default()
                })
                .context("building llm client")?,
            )
        };

        let cache = Cache::with_ttl(
            Arc::new(MemoryStore::default()) as Arc<dyn CacheStore>,
            config.context_config().cache_ttl(),
        );
        let counter = Arc::new(TokenCounter::heuristic());

        Ok(Self::assemble(
            pool,
            index,
            embedder,
            llm,
            cache,
            counter,
            config,
        ))
    }

    /// Wire services from already-built collaborators (used by tests to
    /// inject fakes).
    pub fn assemble(
        pool: DbPool,
        index: Arc<VectorStore>,
        embedder: Arc<dyn EmbeddingService>,
        llm: Arc<dyn LlmClient>,
        cache: Cache,
        counter: Arc<TokenCounter>,
        config: &AppConfig,
    ) -> Self {
        let assembler = Arc::new(ContextAssembler::new(
            pool.clone(),
            Arc::clone(&index),
            Arc::clone(&embedder),
            cache.clone(),
            config.context_config(),
        ));
        let summarizer = Arc::new(Summarizer::new(
            pool.clone(),
            Arc::clone(&assembler),
            Arc::clone(&llm),
            cache.clone(),
            Arc::clone(&counter),
        ));
        let drafter = Arc::new(Drafter::new(
            Arc::clone(&assembler),
            Arc::clone(&llm),
            cache.clone(),
        ));
        let pipeline = Arc::new(MutationPipeline::new(
            pool.clone(),
            index,
            embedder,
            cache.clone(),
            counter,
            config.chunker_config(),
        ));
        let ingest = Arc::new(IngestService::new(pool.clone(), pipeline, cache));

        Self {
            pool,
            ingest,
            assembler,
            summarizer,
            drafter,
        }
    }
}
