//! Reply drafting over assembled context.
//!
//! Takes a caller-supplied intent ("what I want to say") and rewrites it
//! to fit the conversation, optionally mimicking one participant's style.
//! Drafts are cached per (author, intent digest) and invalidated with the
//! rest of the conversation's cache on mutation.

use std::sync::Arc;

use braid_cache::{Cache, keys};
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::assembler::ContextAssembler;
use crate::errors::Result;
use crate::llm::LlmClient;
use crate::prompts::{self, SpeakerStats};

/// Outcome of a draft request.
#[derive(Clone, Debug, PartialEq)]
pub enum DraftOutcome {
    /// A drafted reply.
    Ready(String),
    /// Nothing to do: the intent was empty or the conversation has no
    /// content to draft against.
    NoData,
}

/// Drafts replies in a participant's voice.
pub struct Drafter {
    assembler: Arc<ContextAssembler>,
    llm: Arc<dyn LlmClient>,
    cache: Cache,
}

impl Drafter {
    /// Wire a drafter from its collaborators.
    pub fn new(assembler: Arc<ContextAssembler>, llm: Arc<dyn LlmClient>, cache: Cache) -> Self {
        Self {
            assembler,
            llm,
            cache,
        }
    }

    /// Draft a reply expressing `intent`, as `as_author` when given.
    #[instrument(skip(self, intent))]
    pub async fn draft(
        &self,
        conversation_id: &str,
        as_author: Option<&str>,
        intent: &str,
        use_cache: bool,
    ) -> Result<DraftOutcome> {
        if intent.trim().is_empty() {
            return Ok(DraftOutcome::NoData);
        }

        let cache_key = keys::draft_key(
            conversation_id,
            as_author.unwrap_or("anyone"),
            &intent_digest(intent),
        );
        if use_cache {
            if let Some(cached) = self.cache.get(&cache_key) {
                info!(conversation_id, "draft served from cache");
                return Ok(DraftOutcome::Ready(cached));
            }
        }

        let context = self
            .assembler
            .get_context(conversation_id, None, use_cache)
            .await?;
        if context.is_empty() {
            return Ok(DraftOutcome::NoData);
        }

        let stats = SpeakerStats::from_context(&context);
        let system_prompt = prompts::draft_prompt(&stats, as_author);
        let user_text = format!(
            "Conversation history:\n{context}\n\nMessage to rephrase:\n{intent}"
        );
        let draft = self.llm.complete(&system_prompt, &user_text).await?;

        if use_cache {
            self.cache.set(
                &cache_key,
                &draft,
                Some(self.assembler.config().cache_ttl()),
            );
        }
        info!(conversation_id, "draft generated");
        Ok(DraftOutcome::Ready(draft))
    }
}

/// Short stable digest of the intent text for cache keying.
fn intent_digest(intent: &str) -> String {
    let digest = Sha256::digest(intent.as_bytes());
    // 8 bytes of hex is plenty for cache-key uniqueness
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
