//! Read-Through Fetch
//!
//! Wraps an async producer with the cache store: live hits skip the producer,
//! fresh results are stored, and a failing producer falls back to whatever
//! the store still holds.

use std::fmt::Display;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::{CacheDomain, SharedCache};

/// TTL applied when neither the caller nor the config picks one (5 minutes).
pub const DEFAULT_FETCH_TTL_MS: u64 = 5 * 60 * 1000;

// == Fetch Options ==
/// Per-call knobs for [`CachedFetcher::fetch_with_cache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// TTL for the stored result; the fetcher's default when `None`
    pub ttl_ms: Option<u64>,
    /// Skip the cache lookup and always run the producer
    pub force: bool,
}

impl FetchOptions {
    pub fn with_ttl_ms(ttl_ms: u64) -> Self {
        Self {
            ttl_ms: Some(ttl_ms),
            force: false,
        }
    }

    /// Options carrying the domain's registered TTL.
    pub fn for_domain(domain: CacheDomain) -> Self {
        Self::with_ttl_ms(domain.default_ttl_ms())
    }

    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

// == Cached Fetcher ==
/// Read-through front for a shared cache store.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    cache: SharedCache,
    default_ttl_ms: u64,
}

impl CachedFetcher {
    pub fn new(cache: SharedCache) -> Self {
        Self::with_default_ttl(cache, DEFAULT_FETCH_TTL_MS)
    }

    pub fn with_default_ttl(cache: SharedCache, default_ttl_ms: u64) -> Self {
        Self {
            cache,
            default_ttl_ms,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    // == Fetch With Cache ==
    /// Returns the cached value for `key`, or runs `producer` and caches its
    /// result.
    ///
    /// With `force` the lookup is skipped. If the producer fails, the store
    /// is consulted once more and a value still held there is returned in
    /// place of the error. Because expired entries are evicted by the first
    /// lookup, that fallback only fires for entries that are still live
    /// (typically a forced refresh). The store lock is never held while the
    /// producer runs.
    pub async fn fetch_with_cache<T, E, F, Fut>(
        &self,
        key: &str,
        producer: F,
        options: FetchOptions,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if !options.force {
            let cached = self.cache.write().await.get_as::<T>(key);
            if let Some(value) = cached {
                debug!("Cache hit for {}", key);
                return Ok(value);
            }
        }

        match producer().await {
            Ok(value) => {
                let ttl_ms = options.ttl_ms.unwrap_or(self.default_ttl_ms);
                let stored = self.cache.write().await.set_as(key, &value, ttl_ms);
                if let Err(err) = stored {
                    warn!("Result for {} is not cacheable: {}", key, err);
                }
                Ok(value)
            }
            Err(err) => {
                let fallback = self.cache.write().await.get_as::<T>(key);
                match fallback {
                    Some(value) => {
                        warn!("Serving cached {} after producer failure: {}", key, err);
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
        }
    }
}
