//! Memoizing wrapper around an async fetch function.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use log::debug;

use super::MemoryCache;

type FetchFn<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type KeyFn<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;

/// A fetch function whose successful results are memoized in a [`MemoryCache`].
///
/// Built by [`MemoryCache::with_cache`]. Failed fetches are never cached and
/// the error is handed back to the caller unchanged.
pub struct CachedFetch<A, T, E> {
    cache: MemoryCache<T>,
    fetch: FetchFn<A, T, E>,
    key_fn: KeyFn<A>,
    ttl: Duration,
}

impl<A, T, E> Clone for CachedFetch<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            fetch: Arc::clone(&self.fetch),
            key_fn: Arc::clone(&self.key_fn),
            ttl: self.ttl,
        }
    }
}

impl<A, T, E> CachedFetch<A, T, E>
where
    T: Clone + Send + Sync + 'static,
{
    pub async fn call(&self, args: A) -> Result<T, E> {
        let key = (self.key_fn)(&args);

        if let Some(value) = self.cache.get(&key) {
            debug!("Cache hit: {}", key);
            return Ok(value);
        }

        debug!("Cache miss: {}", key);
        let value = (self.fetch)(args).await?;
        self.cache.set(&key, value.clone(), self.ttl);
        Ok(value)
    }

    /// Drops the cached result for `args`, forcing the next call to fetch.
    pub fn invalidate(&self, args: &A) {
        self.cache.delete(&(self.key_fn)(args));
    }
}

impl<T> MemoryCache<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wraps `fetch` so that results are looked up by `key_fn(args)` and kept
    /// for `ttl`.
    pub fn with_cache<A, E, F, Fut, K>(
        &self,
        fetch: F,
        key_fn: K,
        ttl: Duration,
    ) -> CachedFetch<A, T, E>
    where
        A: 'static,
        E: 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        K: Fn(&A) -> String + Send + Sync + 'static,
    {
        CachedFetch {
            cache: self.clone(),
            fetch: Arc::new(move |args: A| -> BoxFuture<'static, Result<T, E>> {
                Box::pin(fetch(args))
            }),
            key_fn: Arc::new(key_fn),
            ttl,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counting_fetch(
        calls: Arc<AtomicU32>,
    ) -> impl Fn(u32) -> BoxFuture<'static, Result<String, String>> + Send + Sync + 'static {
        move |id: u32| {
            let calls = calls.clone();
            Box::pin(async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if id == 0 {
                    Err("not found".to_string())
                } else {
                    Ok(format!("community-{}", id))
                }
            })
        }
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache: MemoryCache<String> = MemoryCache::new();
        let fetch = cache.with_cache(
            counting_fetch(calls.clone()),
            |id: &u32| format!("community:{}", id),
            Duration::from_secs(60),
        );

        assert_eq!(fetch.call(7).await.unwrap(), "community-7");
        assert_eq!(fetch.call(7).await.unwrap(), "community-7");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.has("community:7"));
    }

    #[tokio::test]
    async fn test_errors_are_rethrown_and_not_cached() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache: MemoryCache<String> = MemoryCache::new();
        let fetch = cache.with_cache(
            counting_fetch(calls.clone()),
            |id: &u32| format!("community:{}", id),
            Duration::from_secs(60),
        );

        assert_eq!(fetch.call(0).await, Err("not found".to_string()));
        assert_eq!(fetch.call(0).await, Err("not found".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_result_is_refetched() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache: MemoryCache<String> = MemoryCache::new();
        let fetch = cache.with_cache(
            counting_fetch(calls.clone()),
            |id: &u32| id.to_string(),
            Duration::from_secs(1),
        );

        fetch.call(3).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        fetch.call(3).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let calls = Arc::new(AtomicU32::new(0));
        let cache: MemoryCache<String> = MemoryCache::new();
        let fetch = cache.with_cache(
            counting_fetch(calls.clone()),
            |id: &u32| id.to_string(),
            Duration::from_secs(60),
        );

        fetch.call(3).await.unwrap();
        fetch.invalidate(&3);
        fetch.call(3).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
