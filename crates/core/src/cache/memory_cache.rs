//! In-process TTL cache.
//!
//! Entries are visible while `now - created < ttl`. Expired entries are
//! removed lazily on read and by an optional background sweeper. The cache is
//! an explicit object: construct it at startup, share it by cloning, and drop
//! it (or stop its sweeper) at shutdown.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Default interval between background sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CacheEntry<V> {
    value: V,
    created: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) >= self.ttl
    }
}

type Entries<V> = DashMap<String, CacheEntry<V>>;

fn purge<V>(entries: &Entries<V>, now: Instant) -> usize {
    let mut removed = 0;
    entries.retain(|_, entry| {
        let keep = !entry.is_expired(now);
        if !keep {
            removed += 1;
        }
        keep
    });
    removed
}

/// Thread-safe TTL cache keyed by string.
///
/// Cloning is cheap and yields a handle to the same entries.
#[derive(Debug)]
pub struct MemoryCache<V = serde_json::Value> {
    entries: Arc<Entries<V>>,
}

impl<V> Clone for MemoryCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }
}

impl<V> MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any existing entry.
    pub fn set(&self, key: &str, value: V, ttl: Duration) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                created: Instant::now(),
                ttl,
            },
        );
    }

    /// Returns the value if present and not expired.
    ///
    /// An expired entry is removed as a side effect.
    pub fn get(&self, key: &str) -> Option<V> {
        self.live(key, |entry| entry.value.clone())
    }

    /// Same expiry check (and lazy removal) as [`get`](Self::get).
    pub fn has(&self, key: &str) -> bool {
        self.live(key, |_| ()).is_some()
    }

    pub fn delete(&self, key: &str) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        purge(&self.entries, Instant::now())
    }

    /// Spawns a task that calls [`purge_expired`](Self::purge_expired) every
    /// `interval`.
    ///
    /// The task only holds a weak reference and exits once every cache handle
    /// has been dropped. Dropping the returned handle stops it as well.
    /// Must be called from within a Tokio runtime.
    pub fn start_sweeper(&self, interval: Duration) -> SweeperHandle {
        let entries: Weak<Entries<V>> = Arc::downgrade(&self.entries);
        let period = interval.max(Duration::from_millis(1));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(entries) = entries.upgrade() else {
                    debug!("Cache dropped, stopping sweeper");
                    break;
                };
                let removed = purge(&entries, Instant::now());
                if removed > 0 {
                    debug!("Cache sweep removed {} expired entries", removed);
                }
            }
        });

        SweeperHandle { handle }
    }

    /// Returns the cached value for `key`, or runs `fetch` and caches its
    /// successful result. Errors are returned to the caller and not cached.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!("Cache hit: {}", key);
            return Ok(value);
        }

        debug!("Cache miss: {}", key);
        let value = fetch().await?;
        self.set(key, value.clone(), ttl);
        Ok(value)
    }

    fn live<R>(&self, key: &str, read: impl FnOnce(&CacheEntry<V>) -> R) -> Option<R> {
        let now = Instant::now();

        // The read guard must be gone before removing, or the shard deadlocks.
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => return Some(read(&entry)),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.entries
                .remove_if(key, |_, entry| entry.is_expired(now));
        }
        None
    }
}

/// Handle to a running sweeper task. Dropping it stops the task.
#[derive(Debug)]
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(self) {
        // Drop aborts
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
