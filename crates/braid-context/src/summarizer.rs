//! Summarization over assembled context.
//!
//! Summaries come in two kinds: the unscoped full chronological summary,
//! which is persisted (append-only, newest row wins) and cached; and
//! query-scoped summaries, which only ever live in the cache. Both feed
//! the packed context through the language-model collaborator.

use std::sync::Arc;

use braid_cache::{Cache, keys};
use braid_core::tokens::TokenCounter;
use braid_store::{DbPool, StoreError, SummaryRepo};
use tracing::{info, instrument, warn};

use crate::assembler::ContextAssembler;
use crate::errors::Result;
use crate::keyinfo;
use crate::llm::LlmClient;
use crate::prompts::{self, SpeakerStats};

/// Outcome of a summary request.
#[derive(Clone, Debug, PartialEq)]
pub enum SummaryOutcome {
    /// A summary, freshly generated or served from cache/store.
    Ready(String),
    /// The conversation has no content to summarize.
    NoData,
}

/// Generates, caches, and persists conversation summaries.
pub struct Summarizer {
    pool: DbPool,
    assembler: Arc<ContextAssembler>,
    llm: Arc<dyn LlmClient>,
    cache: Cache,
    counter: Arc<TokenCounter>,
}

impl Summarizer {
    /// Wire a summarizer from its collaborators.
    pub fn new(
        pool: DbPool,
        assembler: Arc<ContextAssembler>,
        llm: Arc<dyn LlmClient>,
        cache: Cache,
        counter: Arc<TokenCounter>,
    ) -> Self {
        Self {
            pool,
            assembler,
            llm,
            cache,
            counter,
        }
    }

    /// Get a summary, producing one if nothing usable is cached.
    ///
    /// `force_refresh` skips both the cache and the persisted row and
    /// always recomputes.
    #[instrument(skip(self))]
    pub async fn get_or_create(
        &self,
        conversation_id: &str,
        query: Option<&str>,
        use_cache: bool,
        force_refresh: bool,
    ) -> Result<SummaryOutcome> {
        let cache_key = keys::summary_key(conversation_id, query);

        if use_cache && !force_refresh {
            if let Some(cached) = self.cache.get(&cache_key) {
                info!(conversation_id, "summary served from cache");
                return Ok(SummaryOutcome::Ready(cached));
            }
        }

        // Unscoped requests can reuse the latest persisted row.
        if query.is_none() && !force_refresh {
            let conn = self.pool.get().map_err(StoreError::from)?;
            if let Some(existing) = SummaryRepo::latest_full(&conn, conversation_id)? {
                info!(conversation_id, "summary served from store");
                if use_cache {
                    self.cache.set(
                        &cache_key,
                        &existing.content,
                        Some(self.assembler.config().cache_ttl()),
                    );
                }
                return Ok(SummaryOutcome::Ready(existing.content));
            }
        }

        let context = self
            .assembler
            .get_context(conversation_id, query, use_cache)
            .await?;
        if context.is_empty() {
            warn!(conversation_id, "no context available to summarize");
            return Ok(SummaryOutcome::NoData);
        }

        let summary_text = self.summarize(&context, query).await?;
        let token_count = self.counter.count(&summary_text) as u32;

        if query.is_none() {
            let chunk_ids = self.assembler.recent_chunk_ids(conversation_id)?;
            let conn = self.pool.get().map_err(StoreError::from)?;
            let _ = SummaryRepo::insert(
                &conn,
                conversation_id,
                &summary_text,
                &chunk_ids,
                true,
                token_count,
            )?;
        }

        if use_cache {
            self.cache.set(
                &cache_key,
                &summary_text,
                Some(self.assembler.config().cache_ttl()),
            );
        }
        info!(conversation_id, token_count, "summary generated");
        Ok(SummaryOutcome::Ready(summary_text))
    }

    /// Run the prose transformation: speaker stats + key-info refinement +
    /// the summary call itself.
    async fn summarize(&self, context: &str, query: Option<&str>) -> Result<String> {
        let stats = SpeakerStats::from_context(context);
        let budget = self.assembler.config().max_llm_input_tokens;
        let input = self.counter.truncate(context, budget);

        let key_info = self.refined_key_info(context, input).await;

        let system_prompt = prompts::summary_prompt(&stats, query);
        let summary = self.llm.complete(&system_prompt, input).await?;

        Ok(match key_info {
            Some(info) => format!("Key Information:\n{info}\n\nSummary:\n{summary}"),
            None => summary,
        })
    }

    /// Validate regex-extracted key items through the model.
    ///
    /// Best-effort: extraction finding nothing, or the refinement call
    /// failing, both simply drop the section.
    async fn refined_key_info(&self, context: &str, input: &str) -> Option<String> {
        let items = keyinfo::extract_key_items(context);
        if items.is_empty() {
            return None;
        }
        let prompt = prompts::key_info_refinement_prompt(&keyinfo::describe_items(&items));
        match self.llm.complete(&prompt, input).await {
            Ok(refined) => Some(refined),
            Err(e) => {
                warn!(error = %e, "key info refinement failed, omitting section");
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
