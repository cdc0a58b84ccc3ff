//! Read-through caching for the public content paths.
//!
//! - [`store`]: the key-value capability (`get`/`set`-with-TTL/`delete`)
//!   plus a bounded in-process implementation.
//! - [`fetch`]: the cached-fetch helper that memoizes idempotent reads.
//! - [`keys`]: `<domain>:<resource>:<params...>` key composition, chosen so
//!   write paths can invalidate whole families by prefix.
//!
//! Cache failures are invisible to callers: an unreachable store degrades to
//! direct computation with a logged warning.

mod clock;
mod fetch;
pub mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use fetch::{
    CACHE_FETCH_MS, CACHE_HIT_TOTAL, CACHE_MISS_TOTAL, CACHE_STORE_ERROR_TOTAL, cached_fetch,
    invalidate_prefix,
};
pub use store::{CacheStore, MemoryStore, StoreError};
