//! The defensive cache front.
//!
//! Wraps a [`CacheStore`] and absorbs every backend failure: a broken or
//! unreachable store turns each operation into a logged no-op, so callers
//! get correct-but-uncached behavior instead of errors.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::keys;
use crate::store::CacheStore;

/// Default entry time-to-live.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Cache front used by the context assembler, summarizer, and pipeline.
#[derive(Clone)]
pub struct Cache {
    store: Arc<dyn CacheStore>,
    default_ttl: Duration,
}

impl Cache {
    /// Wrap a backend with the default TTL.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self::with_ttl(store, DEFAULT_TTL)
    }

    /// Wrap a backend with a custom default TTL.
    pub fn with_ttl(store: Arc<dyn CacheStore>, default_ttl: Duration) -> Self {
        Self { store, default_ttl }
    }

    /// The TTL applied when `set` is called without an explicit one.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Fetch a string value; `None` on miss or backend failure.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "cache get failed");
                None
            }
        }
    }

    /// Store a string value; best-effort.
    pub fn set(&self, key: &str, value: &str, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        if let Err(e) = self.store.set(key, value.to_owned(), ttl) {
            warn!(key, error = %e, "cache set failed");
        }
    }

    /// Fetch and decode a JSON value; `None` on miss, decode failure, or
    /// backend failure.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "cached value failed to decode, ignoring");
                None
            }
        }
    }

    /// Encode and store a JSON value; best-effort.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        match serde_json::to_string(value) {
            Ok(encoded) => self.set(key, &encoded, ttl),
            Err(e) => warn!(key, error = %e, "value failed to encode for cache"),
        }
    }

    /// Delete a key; `false` on miss or backend failure.
    pub fn delete(&self, key: &str) -> bool {
        match self.store.delete(key) {
            Ok(existed) => existed,
            Err(e) => {
                warn!(key, error = %e, "cache delete failed");
                false
            }
        }
    }

    /// Whether a key exists; `false` on backend failure.
    pub fn exists(&self, key: &str) -> bool {
        match self.store.exists(key) {
            Ok(exists) => exists,
            Err(e) => {
                warn!(key, error = %e, "cache exists failed");
                false
            }
        }
    }

    /// Drop everything cached for a conversation.
    pub fn invalidate_conversation(&self, conversation_id: &str) {
        let prefix = keys::conversation_prefix(conversation_id);
        match self.store.delete_prefix(&prefix) {
            Ok(()) => debug!(conversation_id, "conversation cache invalidated"),
            Err(e) => {
                warn!(conversation_id, error = %e, "cache invalidation failed");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{CacheError, Result};
    use crate::memory::MemoryStore;
    use serde::Deserialize;

    /// Backend that fails every operation, standing in for an unreachable
    /// cache server.
    pub struct FailingStore;

    impl CacheStore for FailingStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(CacheError::Backend("connection refused".into()))
        }
        fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
            Err(CacheError::Backend("connection refused".into()))
        }
        fn delete(&self, _key: &str) -> Result<bool> {
            Err(CacheError::Backend("connection refused".into()))
        }
        fn exists(&self, _key: &str) -> Result<bool> {
            Err(CacheError::Backend("connection refused".into()))
        }
        fn delete_prefix(&self, _prefix: &str) -> Result<()> {
            Err(CacheError::Backend("connection refused".into()))
        }
    }

    fn memory_cache() -> (Cache, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        (Cache::new(store.clone() as Arc<dyn CacheStore>), store)
    }

    #[test]
    fn set_get_roundtrip() {
        let (cache, _) = memory_cache();
        cache.set("k", "value", None);
        assert_eq!(cache.get("k"), Some("value".to_owned()));
    }

    #[test]
    fn json_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Payload {
            count: u32,
            label: String,
        }

        let (cache, _) = memory_cache();
        let payload = Payload {
            count: 3,
            label: "chunks".into(),
        };
        cache.set_json("k", &payload, None);
        assert_eq!(cache.get_json::<Payload>("k"), Some(payload));
    }

    #[test]
    fn plain_string_survives_json_accessor_mismatch() {
        let (cache, _) = memory_cache();
        cache.set("k", "not json at all", None);
        // Reading as JSON degrades to a miss rather than an error
        assert_eq!(cache.get_json::<u32>("k"), None);
        assert_eq!(cache.get("k"), Some("not json at all".to_owned()));
    }

    #[test]
    fn invalidate_conversation_clears_only_that_conversation() {
        let (cache, store) = memory_cache();
        cache.set(&keys::context_key("a"), "ctx-a", None);
        cache.set(&keys::summary_key("a", None), "sum-a", None);
        cache.set(&keys::context_key("b"), "ctx-b", None);

        cache.invalidate_conversation("a");
        store.run_pending_tasks();

        assert_eq!(cache.get(&keys::context_key("a")), None);
        assert_eq!(cache.get(&keys::summary_key("a", None)), None);
        assert_eq!(cache.get(&keys::context_key("b")), Some("ctx-b".to_owned()));
    }

    // ── Unreachable backend ──────────────────────────────────────────────

    #[test]
    fn failing_backend_get_is_none() {
        let cache = Cache::new(Arc::new(FailingStore));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn failing_backend_set_is_noop() {
        let cache = Cache::new(Arc::new(FailingStore));
        cache.set("k", "v", None); // must not panic or error
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn failing_backend_delete_and_exists_are_false() {
        let cache = Cache::new(Arc::new(FailingStore));
        assert!(!cache.delete("k"));
        assert!(!cache.exists("k"));
    }

    #[test]
    fn failing_backend_invalidation_is_noop() {
        let cache = Cache::new(Arc::new(FailingStore));
        cache.invalidate_conversation("a"); // must not panic
    }
}
