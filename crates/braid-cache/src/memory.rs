//! In-process cache backend over moka.

use std::time::{Duration, Instant};

use moka::Expiry;
use moka::sync::Cache as MokaCache;

use crate::errors::{CacheError, Result};
use crate::store::CacheStore;

/// Entries carry their own TTL so one cache can hold mixed lifetimes.
type Entry = (String, Duration);

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _now: Instant) -> Option<Duration> {
        Some(value.1)
    }
}

/// Moka-backed in-process [`CacheStore`].
pub struct MemoryStore {
    inner: MokaCache<String, Entry>,
}

impl MemoryStore {
    /// Create a store holding at most `max_entries` values.
    pub fn new(max_entries: u64) -> Self {
        let inner = MokaCache::builder()
            .max_capacity(max_entries)
            .expire_after(PerEntryTtl)
            .support_invalidation_closures()
            .build();
        Self { inner }
    }

    /// Flush pending internal maintenance (expirations, invalidations).
    ///
    /// Only needed when a test wants deterministic visibility.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).map(|(value, _)| value))
    }

    fn set(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.inner.insert(key.to_owned(), (value, ttl));
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let existed = self.inner.remove(key).is_some();
        Ok(existed)
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.inner.contains_key(key))
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        let prefix = prefix.to_owned();
        self.inner
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn ttl() -> Duration {
        Duration::from_secs(60)
    }

    #[test]
    fn set_get_roundtrip() {
        let store = MemoryStore::default();
        store.set("k", "v".into(), ttl()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_owned()));
    }

    #[test]
    fn get_missing_is_none() {
        let store = MemoryStore::default();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn delete_reports_existence() {
        let store = MemoryStore::default();
        store.set("k", "v".into(), ttl()).unwrap();
        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn exists_tracks_set_and_delete() {
        let store = MemoryStore::default();
        assert!(!store.exists("k").unwrap());
        store.set("k", "v".into(), ttl()).unwrap();
        assert!(store.exists("k").unwrap());
        let _ = store.delete("k").unwrap();
        assert!(!store.exists("k").unwrap());
    }

    #[test]
    fn entries_expire_after_their_ttl() {
        let store = MemoryStore::default();
        store
            .set("short", "v".into(), Duration::from_millis(40))
            .unwrap();
        store.set("long", "v".into(), ttl()).unwrap();

        std::thread::sleep(Duration::from_millis(80));
        store.run_pending_tasks();

        assert_eq!(store.get("short").unwrap(), None);
        assert_eq!(store.get("long").unwrap(), Some("v".to_owned()));
    }

    #[test]
    fn delete_prefix_removes_only_matching_keys() {
        let store = MemoryStore::default();
        store
            .set("conversation:a:context", "x".into(), ttl())
            .unwrap();
        store
            .set("conversation:a:summary", "y".into(), ttl())
            .unwrap();
        store
            .set("conversation:b:context", "z".into(), ttl())
            .unwrap();

        store.delete_prefix("conversation:a:").unwrap();
        store.run_pending_tasks();

        assert_eq!(store.get("conversation:a:context").unwrap(), None);
        assert_eq!(store.get("conversation:a:summary").unwrap(), None);
        assert_eq!(
            store.get("conversation:b:context").unwrap(),
            Some("z".to_owned())
        );
    }

    #[test]
    fn overwrite_replaces_value() {
        let store = MemoryStore::default();
        store.set("k", "old".into(), ttl()).unwrap();
        store.set("k", "new".into(), ttl()).unwrap();
        assert_eq!(store.get("k").unwrap(), Some("new".to_owned()));
    }
}
