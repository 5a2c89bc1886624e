//! Bitlazer Cache - data layer for the Bitlazer bridge and staking client
//!
//! Provides a TTL cache with a persistent mirror, read-through fetching with
//! stale-on-error fallback, request deduplication and per-key rate limiting.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;

pub use api::AppState;
pub use cache::{CacheDomain, CacheStore};
pub use config::Config;
pub use fetch::{CachedFetcher, Deduplicator, FetchOptions, RateLimiter};
