//! Generic TTL memory cache.
//!
//! - [`MemoryCache`]: string-keyed map with per-entry TTL, lazy expiry on read
//!   and an optional background sweeper
//! - [`CachedFetch`]: memoizing wrapper built with [`MemoryCache::with_cache`]

mod cached_fetch;
mod memory_cache;

pub use cached_fetch::CachedFetch;
pub use memory_cache::{MemoryCache, SweeperHandle, DEFAULT_SWEEP_INTERVAL};
