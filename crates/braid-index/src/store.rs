//! Cache-aside vector store: one [`FlatIndex`] per conversation, persisted
//! as two files and cached in memory after first load.
//!
//! Loaded indices sit in an arena keyed by conversation id; each entry is
//! behind its own mutex so adds to one conversation serialize file I/O
//! without blocking any other conversation. The arena never evicts on its
//! own (matching the behavior this store replaces) — `delete_conversation`
//! and `evict` are the only paths that shrink it.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use braid_embeddings::EmbeddingService;

use crate::config::IndexConfig;
use crate::errors::Result;
use crate::flat::FlatIndex;

/// One semantic search hit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchHit {
    /// Persistent id of the matching chunk.
    pub chunk_id: i64,
    /// Relative relevance score in `[0, 1]`, best match closest to 1.0.
    ///
    /// Derived from L2 distances normalized against the worst distance in
    /// this result set — a ranking score for one search call, not a cosine
    /// similarity, and not comparable across searches.
    pub score: f32,
}

/// Per-conversation vector index store.
pub struct VectorStore {
    config: IndexConfig,
    arena: RwLock<HashMap<String, Arc<Mutex<FlatIndex>>>>,
}

impl VectorStore {
    /// Create a store rooted at `config.index_dir` (created if missing).
    pub fn new(config: IndexConfig) -> Result<Self> {
        fs::create_dir_all(&config.index_dir)?;
        Ok(Self {
            config,
            arena: RwLock::new(HashMap::new()),
        })
    }

    /// Index dimensions.
    pub fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    /// Add an embedding for `chunk_id`, persisting the index before
    /// returning.
    ///
    /// Returns the row position, or `None` for an empty embedding or when
    /// persistence fails (logged, never propagated — the chunk simply has
    /// no semantic entry).
    pub fn add_embedding(
        &self,
        embedding: Vec<f32>,
        conversation_id: &str,
        chunk_id: i64,
    ) -> Option<usize> {
        if embedding.is_empty() {
            return None;
        }
        let entry = self.entry(conversation_id);
        let mut index = entry.lock();
        let position = index.push(embedding, chunk_id);

        if let Err(e) = self.persist(conversation_id, &index) {
            warn!(conversation_id, chunk_id, error = %e, "failed to persist index");
            return None;
        }
        debug!(conversation_id, chunk_id, position, "embedding indexed");
        Some(position)
    }

    /// Nearest-neighbor search with a pre-computed query embedding.
    ///
    /// `top_k` is clamped to the index size. Missing or empty indices give
    /// an empty result, as does any load failure.
    pub fn search(
        &self,
        query_embedding: &[f32],
        conversation_id: &str,
        top_k: usize,
    ) -> Vec<SearchHit> {
        if query_embedding.is_empty() {
            return Vec::new();
        }
        let mut query = query_embedding.to_vec();
        query.resize(self.config.dimensions, 0.0);

        let entry = self.entry(conversation_id);
        let index = entry.lock();
        if index.is_empty() {
            debug!(conversation_id, "search on empty index");
            return Vec::new();
        }

        let scored = index.scan(&query, top_k);
        relative_scores(&scored)
    }

    /// Embed `query_text` and search with the result.
    ///
    /// An embedding failure (provider down, unrecognized response) yields
    /// an empty result set.
    pub async fn search_by_text(
        &self,
        embedder: &dyn EmbeddingService,
        query_text: &str,
        conversation_id: &str,
        top_k: usize,
    ) -> Vec<SearchHit> {
        let query = match embedder.embed_one(query_text).await {
            Ok(v) => v,
            Err(e) => {
                warn!(conversation_id, error = %e, "query embedding failed");
                return Vec::new();
            }
        };
        self.search(&query, conversation_id, top_k)
    }

    /// Remove the persisted files and the in-memory entry for a
    /// conversation. Idempotent.
    pub fn delete_conversation(&self, conversation_id: &str) {
        let _ = self.arena.write().remove(conversation_id);
        for path in [
            self.config.vectors_path(conversation_id),
            self.config.map_path(conversation_id),
        ] {
            match fs::remove_file(&path) {
                Ok(()) => info!(conversation_id, path = %path.display(), "index file removed"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(conversation_id, path = %path.display(), error = %e, "failed to remove index file");
                }
            }
        }
    }

    /// Drop a conversation's in-memory entry, keeping the files. The next
    /// access reloads from disk.
    pub fn evict(&self, conversation_id: &str) {
        let _ = self.arena.write().remove(conversation_id);
    }

    /// Number of indices currently loaded in memory.
    pub fn loaded_count(&self) -> usize {
        self.arena.read().len()
    }

    /// Arena entry for a conversation: cached, loaded from disk, or new.
    fn entry(&self, conversation_id: &str) -> Arc<Mutex<FlatIndex>> {
        if let Some(entry) = self.arena.read().get(conversation_id) {
            return Arc::clone(entry);
        }

        let mut arena = self.arena.write();
        // Another thread may have loaded it between the locks.
        if let Some(entry) = arena.get(conversation_id) {
            return Arc::clone(entry);
        }

        let index = match self.load(conversation_id) {
            Ok(Some(index)) => {
                info!(conversation_id, rows = index.len(), "loaded index from disk");
                index
            }
            Ok(None) => {
                debug!(conversation_id, "creating new index");
                FlatIndex::new(self.config.dimensions)
            }
            Err(e) => {
                warn!(conversation_id, error = %e, "failed to load index, starting empty");
                FlatIndex::new(self.config.dimensions)
            }
        };

        let entry = Arc::new(Mutex::new(index));
        let _ = arena.insert(conversation_id.to_owned(), Arc::clone(&entry));
        entry
    }

    /// Load both files, or `None` when the conversation has no index yet.
    fn load(&self, conversation_id: &str) -> Result<Option<FlatIndex>> {
        let vectors_path = self.config.vectors_path(conversation_id);
        let map_path = self.config.map_path(conversation_id);
        if !vectors_path.exists() || !map_path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&vectors_path)?;
        let chunk_ids: Vec<i64> = serde_json::from_slice(&fs::read(&map_path)?)?;
        Ok(Some(FlatIndex::from_bytes(&bytes, chunk_ids)?))
    }

    /// Rewrite both files through temp-file + rename so a crash mid-write
    /// never leaves a partial file behind.
    fn persist(&self, conversation_id: &str, index: &FlatIndex) -> Result<()> {
        write_atomic(
            &self.config.vectors_path(conversation_id),
            &index.to_bytes(),
        )?;
        write_atomic(
            &self.config.map_path(conversation_id),
            &serde_json::to_vec(index.chunk_ids())?,
        )?;
        Ok(())
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

/// Convert ascending L2 distances into descending relative scores.
///
/// `score_i = 1 - d_i / (d_worst + eps)`: the best hit lands near 1.0 and
/// the worst near 0.0, mirroring how callers rank and annotate hits.
fn relative_scores(scored: &[(i64, f32)]) -> Vec<SearchHit> {
    let Some(&(_, worst)) = scored.last() else {
        return Vec::new();
    };
    let denom = worst + 1e-5;
    scored
        .iter()
        .map(|&(chunk_id, distance)| SearchHit {
            chunk_id,
            score: 1.0 - distance / denom,
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
