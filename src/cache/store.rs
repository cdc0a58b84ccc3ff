//! Key-value store capability behind the cached-fetch helper.
//!
//! The trait mirrors an external store contract: absence and expiry are
//! indistinguishable to callers, and every operation can fail with
//! [`StoreError`] when the backend is unreachable. The shipped
//! implementation is an in-process bounded store; the trait is the seam for
//! a networked replacement.

use std::num::NonZeroUsize;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use super::clock::{Clock, SystemClock};
use super::lock::rw_write;

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Fresh value for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Associate `value` with `key` for `ttl`, replacing any previous entry.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    /// Remove every entry whose key starts with `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
struct Entry {
    value: Value,
    expires_at: OffsetDateTime,
}

/// Bounded in-process store: LRU capacity plus per-entry expiry.
///
/// Expired entries are dropped lazily on lookup; capacity eviction is
/// delegated to the LRU policy.
pub struct MemoryStore {
    entries: RwLock<LruCache<String, Entry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_clock(capacity, Arc::new(SystemClock))
    }

    pub fn with_clock(capacity: NonZeroUsize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(capacity)),
            clock,
        }
    }

    pub fn len(&self) -> usize {
        rw_write(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let now = self.clock.now();
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.pop(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), StoreError> {
        let expires_at = self.clock.now() + ttl;
        let entry = Entry { value, expires_at };
        rw_write(&self.entries, SOURCE, "set").put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        rw_write(&self.entries, SOURCE, "delete").pop(key);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<(), StoreError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete_prefix");
        let matching: Vec<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        for key in matching {
            entries.pop(&key);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::super::clock::ManualClock;
    use super::*;

    fn store_with_clock() -> (MemoryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let store = MemoryStore::with_clock(
            NonZeroUsize::new(16).expect("capacity"),
            clock.clone(),
        );
        (store, clock)
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (store, _clock) = store_with_clock();
        store
            .set("blog:post:a", json!({"title": "A"}), Duration::from_secs(60))
            .await
            .expect("set");

        let value = store.get("blog:post:a").await.expect("get");
        assert_eq!(value, Some(json!({"title": "A"})));
    }

    #[tokio::test]
    async fn expired_entries_read_as_absent() {
        let (store, clock) = store_with_clock();
        store
            .set("blog:post:a", json!(1), Duration::from_secs(60))
            .await
            .expect("set");

        clock.advance(Duration::from_secs(61));

        assert_eq!(store.get("blog:post:a").await.expect("get"), None);
        // The lazy sweep dropped the stale entry.
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn entry_is_fresh_until_the_ttl_boundary() {
        let (store, clock) = store_with_clock();
        store
            .set("k", json!(1), Duration::from_secs(60))
            .await
            .expect("set");

        clock.advance(Duration::from_secs(59));
        assert_eq!(store.get("k").await.expect("get"), Some(json!(1)));

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_key() {
        let (store, _clock) = store_with_clock();
        let ttl = Duration::from_secs(60);
        store.set("blog:post:a", json!(1), ttl).await.expect("set");
        store.set("blog:post:b", json!(2), ttl).await.expect("set");

        store.delete("blog:post:a").await.expect("delete");

        assert_eq!(store.get("blog:post:a").await.expect("get"), None);
        assert_eq!(store.get("blog:post:b").await.expect("get"), Some(json!(2)));

        // Deleting an absent key is a no-op.
        store.delete("blog:post:a").await.expect("delete");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_prefix_removes_only_the_family() {
        let (store, _clock) = store_with_clock();
        let ttl = Duration::from_secs(60);
        store.set("blog:post:a", json!(1), ttl).await.expect("set");
        store.set("blog:list:1:10:0", json!(2), ttl).await.expect("set");
        store.set("services:list", json!(3), ttl).await.expect("set");

        store.delete_prefix("blog:").await.expect("delete_prefix");

        assert_eq!(store.get("blog:post:a").await.expect("get"), None);
        assert_eq!(store.get("blog:list:1:10:0").await.expect("get"), None);
        assert_eq!(store.get("services:list").await.expect("get"), Some(json!(3)));
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let store =
            MemoryStore::with_clock(NonZeroUsize::new(2).expect("capacity"), clock);
        let ttl = Duration::from_secs(60);

        store.set("a", json!(1), ttl).await.expect("set");
        store.set("b", json!(2), ttl).await.expect("set");
        // Touch `a` so `b` becomes the eviction candidate.
        assert!(store.get("a").await.expect("get").is_some());
        store.set("c", json!(3), ttl).await.expect("set");

        assert!(store.get("a").await.expect("get").is_some());
        assert_eq!(store.get("b").await.expect("get"), None);
        assert!(store.get("c").await.expect("get").is_some());
    }
}
