//! Embedding service trait and mock implementation.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::{EmbeddingError, Result};
use crate::normalize::l2_normalize;

/// Trait for embedding text into vectors.
///
/// An `Ok` result carrying an *empty* vector means "no embedding for this
/// input" — backends use it for provider outages and unrecognized response
/// shapes, so callers can degrade instead of failing the request.
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of texts, preserving order.
    ///
    /// Default implementation applies [`embed_one`](Self::embed_one) per
    /// item; a failed item yields an empty vector and never aborts the
    /// rest of the batch.
    async fn embed_batch(&self, texts: &[String]) -> Vec<Vec<f32>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed_one(text).await.unwrap_or_default());
        }
        results
    }

    /// Output embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Mock embedding service for tests and offline runs.
///
/// Hashes input text with SHA-256 and uses the digest bytes as vector
/// components, so equal inputs always embed identically and distinct
/// inputs almost never collide.
pub struct MockEmbeddingService {
    dims: usize,
    ready: AtomicBool,
}

impl MockEmbeddingService {
    /// Create a mock with the given dimensions.
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            ready: AtomicBool::new(true),
        }
    }

    /// Flip readiness; a non-ready mock errors on every call.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    fn hash_to_vector(&self, text: &str) -> Vec<f32> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        let mut v: Vec<f32> = (0..self.dims)
            .map(|i| {
                // Mix position into the byte choice so short digests still
                // fill large vectors without a repeating period of 32.
                let byte = hash[(i * 7 + i / hash.len()) % hash.len()];
                (f32::from(byte) / 127.5) - 1.0
            })
            .collect();
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl EmbeddingService for MockEmbeddingService {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        if !self.ready.load(Ordering::SeqCst) {
            return Err(EmbeddingError::NotReady);
        }
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.hash_to_vector(text))
    }

    fn dimensions(&self) -> usize {
        self.dims
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
