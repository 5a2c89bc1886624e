//! API Handlers
//!
//! HTTP request handlers for each cache service endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, RawQuery, State},
    Json,
};
use serde_json::Value;
use tracing::warn;

use crate::cache::{
    self, CacheDomain, CacheStore, FileStorage, PersistentMirror, SharedCache, SystemClock,
};
use crate::config::Config;
use crate::error::{CacheError, FetchError, Result};
use crate::fetch::{CachedFetcher, Deduplicator, FetchOptions, RateLimiter, UpstreamClient};
use crate::models::{
    forwarded_query, validate_key, ClearResponse, DeleteResponse, FetchQuery, FetchResponse, GetResponse,
    HealthResponse, RegistryResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// One cache store, deduplicator and rate limiter per process, all injected
/// here rather than held in globals.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: SharedCache,
    /// Read-through front of `cache`
    pub fetcher: CachedFetcher,
    /// Collapses concurrent upstream requests per cache key
    pub dedupe: Deduplicator<Value, FetchError>,
    /// Spaces upstream requests per domain
    pub limiter: RateLimiter,
    /// Producer for `/fetch`; `None` when no upstream is configured
    pub upstream: Option<UpstreamClient>,
}

impl AppState {
    /// Creates a new AppState around the given cache store with default
    /// fetch settings and no upstream.
    pub fn new(store: CacheStore) -> Self {
        let cache = cache::shared(store);
        Self {
            fetcher: CachedFetcher::new(cache.clone()),
            cache,
            dedupe: Deduplicator::new(),
            limiter: RateLimiter::default(),
            upstream: None,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// A mirror directory that cannot be opened is logged and the cache runs
    /// in-memory only.
    pub fn from_config(config: &Config) -> std::result::Result<Self, FetchError> {
        let mirror = match &config.mirror_dir {
            Some(dir) => match FileStorage::open(dir) {
                Ok(storage) => PersistentMirror::new(storage),
                Err(err) => {
                    warn!(
                        "Cache mirror directory {} unusable, running in-memory only: {}",
                        dir.display(),
                        err
                    );
                    PersistentMirror::disabled()
                }
            },
            None => PersistentMirror::disabled(),
        };

        let cache = cache::shared(CacheStore::open(mirror, Arc::new(SystemClock)));
        let upstream = match &config.upstream_base_url {
            Some(url) => Some(UpstreamClient::new(url.clone(), config.upstream_timeout())?),
            None => None,
        };

        Ok(Self {
            fetcher: CachedFetcher::with_default_ttl(cache.clone(), config.default_ttl_ms),
            cache,
            dedupe: Deduplicator::new(),
            limiter: RateLimiter::new(config.rate_limit_interval()),
            upstream,
        })
    }

    pub fn with_upstream(mut self, upstream: UpstreamClient) -> Self {
        self.upstream = Some(upstream);
        self
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }
}

/// Handler for PUT /cache/:key
///
/// Stores a JSON value with an optional TTL.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let ttl_ms = req.ttl_ms.unwrap_or(state.fetcher.default_ttl_ms());
    state.cache.write().await.set(key.clone(), req.value, ttl_ms);

    Ok(Json(SetResponse::new(key, ttl_ms)))
}

/// Handler for GET /cache/:key
///
/// Returns the live value; an expired entry is evicted and reported as 404.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a read may evict
    let mut cache = state.cache.write().await;
    let value = cache
        .get(&key)
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let now = cache.now_ms();
    let ttl_remaining_ms = cache
        .peek(&key)
        .map(|entry| entry.ttl_remaining_ms(now))
        .unwrap_or(0);

    Ok(Json(GetResponse::new(key, value, ttl_remaining_ms)))
}

/// Handler for DELETE /cache/:key
///
/// Succeeds whether or not the key existed.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<DeleteResponse> {
    state.cache.write().await.delete(&key);
    Json(DeleteResponse::new(key))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let cleared = cache.len();
    cache.clear();

    Json(ClearResponse::new(cleared))
}

/// Handler for GET /fetch/:domain/*path
///
/// Read-through fetch of an upstream path under the domain's key and TTL.
/// The query string, minus `force`, is forwarded upstream and is part of the
/// cache key. Concurrent identical requests share one upstream call, and
/// upstream calls per domain are spaced by the rate limiter.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Path((domain, path)): Path<(String, String)>,
    Query(query): Query<FetchQuery>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<FetchResponse>> {
    let domain: CacheDomain = domain.parse()?;
    let upstream = state.upstream.clone().ok_or_else(|| {
        CacheError::UpstreamUnavailable("no upstream base URL configured".to_string())
    })?;

    let path = path.trim_start_matches('/');
    let path = match forwarded_query(raw_query.as_deref()) {
        Some(forwarded) => format!("{}?{}", path, forwarded),
        None => path.to_string(),
    };
    let key = domain.key(&path);
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let limiter = state.limiter.clone();
    let producer = move || async move {
        limiter
            .throttle(domain.prefix(), || upstream.get_json(&path))
            .await
    };

    let value = state
        .fetcher
        .fetch_with_cache(
            &key,
            || state.dedupe.debounced_fetch(&key, producer),
            FetchOptions::for_domain(domain).force(query.force),
        )
        .await?;

    Ok(Json(FetchResponse { domain, key, value }))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let (stats, persistent) = {
        let cache = state.cache.read().await;
        (cache.stats(), cache.is_persistent())
    };
    let in_flight = state.dedupe.in_flight().await;

    Json(StatsResponse::new(&stats, persistent, in_flight))
}

/// Handler for GET /registry
pub async fn registry_handler() -> Json<RegistryResponse> {
    Json(RegistryResponse::current())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
