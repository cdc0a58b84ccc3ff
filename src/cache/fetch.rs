//! Read-through cache helper.
//!
//! [`cached_fetch`] memoizes the result of an idempotent async computation
//! in a [`CacheStore`] for a bounded time window. The store is strictly
//! best-effort: any store failure degrades to a direct fetch and a warning,
//! while fetch failures propagate to the caller unmodified.
//!
//! There is no protection against duplicate concurrent recomputation of the
//! same key. Two simultaneous misses both invoke the fetch function; the
//! wrapped queries are idempotent reads, so the last write wins harmlessly.

use std::future::Future;
use std::time::Duration;

use metrics::{counter, histogram};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::store::CacheStore;

pub const CACHE_HIT_TOTAL: &str = "praxis_cache_hit_total";
pub const CACHE_MISS_TOTAL: &str = "praxis_cache_miss_total";
pub const CACHE_STORE_ERROR_TOTAL: &str = "praxis_cache_store_error_total";
pub const CACHE_FETCH_MS: &str = "praxis_cache_fetch_ms";

/// Return the fresh cached value under `key`, or compute one via `fetch` and
/// store it with `ttl`.
///
/// The value is typed identically whether it came from the cache or from the
/// fetch function; a cached payload that no longer deserializes as `T` is
/// treated as a miss and overwritten.
pub async fn cached_fetch<S, T, F, Fut, E>(
    store: &S,
    key: &str,
    ttl: Duration,
    fetch: F,
) -> Result<T, E>
where
    S: CacheStore + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut store_usable = true;

    match store.get(key).await {
        Ok(Some(raw)) => match serde_json::from_value::<T>(raw) {
            Ok(value) => {
                counter!(CACHE_HIT_TOTAL).increment(1);
                return Ok(value);
            }
            Err(err) => {
                warn!(
                    target = "praxis::cache",
                    key,
                    error = %err,
                    "cached payload no longer deserializes; recomputing"
                );
            }
        },
        Ok(None) => {}
        Err(err) => {
            counter!(CACHE_STORE_ERROR_TOTAL).increment(1);
            warn!(
                target = "praxis::cache",
                key,
                error = %err,
                "cache store unreachable; falling back to direct fetch"
            );
            store_usable = false;
        }
    }

    counter!(CACHE_MISS_TOTAL).increment(1);

    let started = std::time::Instant::now();
    let value = fetch().await?;
    histogram!(CACHE_FETCH_MS).record(started.elapsed().as_secs_f64() * 1_000.0);

    if store_usable {
        match serde_json::to_value(&value) {
            Ok(raw) => {
                if let Err(err) = store.set(key, raw, ttl).await {
                    counter!(CACHE_STORE_ERROR_TOTAL).increment(1);
                    warn!(
                        target = "praxis::cache",
                        key,
                        error = %err,
                        "cache population failed; returning fresh value"
                    );
                }
            }
            Err(err) => {
                warn!(
                    target = "praxis::cache",
                    key,
                    error = %err,
                    "value not serializable for caching; returning fresh value"
                );
            }
        }
    }

    Ok(value)
}

/// Best-effort keyed invalidation; store failures are logged, never surfaced.
pub async fn invalidate_prefix<S>(store: &S, prefix: &str)
where
    S: CacheStore + ?Sized,
{
    if let Err(err) = store.delete_prefix(prefix).await {
        counter!(CACHE_STORE_ERROR_TOTAL).increment(1);
        warn!(
            target = "praxis::cache",
            prefix,
            error = %err,
            "cache invalidation failed; entries will age out via TTL"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::Value;
    use thiserror::Error;
    use time::OffsetDateTime;

    use super::super::clock::ManualClock;
    use super::super::store::{MemoryStore, StoreError};
    use super::*;

    #[derive(Debug, Error, PartialEq, Eq)]
    #[error("fetch blew up")]
    struct FetchFailure;

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }

        async fn delete_prefix(&self, _prefix: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection refused".into()))
        }
    }

    /// Reads fine, but every write is rejected.
    struct ReadOnlyStore;

    #[async_trait]
    impl CacheStore for ReadOnlyStore {
        async fn get(&self, _key: &str) -> Result<Option<Value>, StoreError> {
            Ok(None)
        }

        async fn set(&self, _key: &str, _value: Value, _ttl: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write rejected".into()))
        }

        async fn delete(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write rejected".into()))
        }

        async fn delete_prefix(&self, _prefix: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write rejected".into()))
        }
    }

    fn test_store() -> (MemoryStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH));
        let store = MemoryStore::with_clock(
            NonZeroUsize::new(16).expect("capacity"),
            clock.clone(),
        );
        (store, clock)
    }

    #[tokio::test]
    async fn miss_invokes_fetch_exactly_once_and_stores() {
        let (store, _clock) = test_store();
        let calls = AtomicUsize::new(0);

        let value: Result<String, FetchFailure> =
            cached_fetch(&store, "blog:post:a", Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("fresh".to_string()) }
            })
            .await;

        assert_eq!(value.expect("value"), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn hit_returns_cached_value_without_fetching() {
        let (store, _clock) = test_store();

        let first: Result<String, FetchFailure> =
            cached_fetch(&store, "k", Duration::from_secs(60), || async {
                Ok("first".to_string())
            })
            .await;
        assert_eq!(first.expect("value"), "first");

        let calls = AtomicUsize::new(0);
        let second: Result<String, FetchFailure> =
            cached_fetch(&store, "k", Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("second".to_string()) }
            })
            .await;

        assert_eq!(second.expect("value"), "first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expiry_forces_recomputation() {
        let (store, clock) = test_store();
        let ttl = Duration::from_secs(43_200);

        let first: Result<serde_json::Value, FetchFailure> =
            cached_fetch(&store, "blog:post:my-slug", ttl, || async {
                Ok(serde_json::json!({"title": "X"}))
            })
            .await;
        assert_eq!(first.expect("value"), serde_json::json!({"title": "X"}));

        // Within the window the stale fetch closure must not run.
        let second: Result<serde_json::Value, FetchFailure> =
            cached_fetch(&store, "blog:post:my-slug", ttl, || async {
                Ok(serde_json::json!({"title": "Y"}))
            })
            .await;
        assert_eq!(second.expect("value"), serde_json::json!({"title": "X"}));

        clock.advance(Duration::from_secs(43_201));

        let third: Result<serde_json::Value, FetchFailure> =
            cached_fetch(&store, "blog:post:my-slug", ttl, || async {
                Ok(serde_json::json!({"title": "Y"}))
            })
            .await;
        assert_eq!(third.expect("value"), serde_json::json!({"title": "Y"}));
    }

    #[tokio::test]
    async fn store_failure_degrades_to_direct_fetch() {
        let value: Result<String, FetchFailure> =
            cached_fetch(&BrokenStore, "k", Duration::from_secs(60), || async {
                Ok("fresh".to_string())
            })
            .await;

        assert_eq!(value.expect("value"), "fresh");
    }

    #[tokio::test]
    async fn rejected_write_is_swallowed_after_a_successful_fetch() {
        let value: Result<String, FetchFailure> =
            cached_fetch(&ReadOnlyStore, "k", Duration::from_secs(60), || async {
                Ok("fresh".to_string())
            })
            .await;

        assert_eq!(value.expect("value"), "fresh");

        // Nothing was stored, so the next read fetches again.
        let calls = AtomicUsize::new(0);
        let again: Result<String, FetchFailure> =
            cached_fetch(&ReadOnlyStore, "k", Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok("fresh".to_string()) }
            })
            .await;
        assert_eq!(again.expect("value"), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_failure_propagates_and_stores_nothing() {
        let (store, _clock) = test_store();

        let result: Result<String, FetchFailure> =
            cached_fetch(&store, "k", Duration::from_secs(60), || async {
                Err(FetchFailure)
            })
            .await;

        assert_eq!(result.unwrap_err(), FetchFailure);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn none_is_a_cacheable_sentinel() {
        let (store, _clock) = test_store();

        let first: Result<Option<String>, FetchFailure> =
            cached_fetch(&store, "blog:post:missing", Duration::from_secs(60), || {
                async { Ok(None) }
            })
            .await;
        assert_eq!(first.expect("value"), None);

        // Cached "not found" short-circuits the second lookup.
        let calls = AtomicUsize::new(0);
        let second: Result<Option<String>, FetchFailure> =
            cached_fetch(&store, "blog:post:missing", Duration::from_secs(60), || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(Some("late".to_string())) }
            })
            .await;
        assert_eq!(second.expect("value"), None);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn undeserializable_payload_is_a_miss() {
        let (store, _clock) = test_store();
        store
            .set("k", serde_json::json!("not a number"), Duration::from_secs(60))
            .await
            .expect("set");

        let value: Result<u64, FetchFailure> =
            cached_fetch(&store, "k", Duration::from_secs(60), || async { Ok(7) }).await;

        assert_eq!(value.expect("value"), 7);
        // The bad payload was overwritten with the fresh value.
        assert_eq!(
            store.get("k").await.expect("get"),
            Some(serde_json::json!(7))
        );
    }

    #[tokio::test]
    async fn invalidate_prefix_swallows_store_errors() {
        invalidate_prefix(&BrokenStore, "blog:").await;
    }
}
