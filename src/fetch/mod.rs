//! Fetch Module
//!
//! Wrappers composed around async producers: read-through caching, request
//! deduplication and per-key rate limiting, plus the upstream HTTP producer.
//!
//! The usual stack, outermost first, is
//! `fetch_with_cache(debounced_fetch(throttle(producer)))`.

mod cached;
mod dedupe;
mod throttle;
mod upstream;

pub use cached::{CachedFetcher, FetchOptions, DEFAULT_FETCH_TTL_MS};
pub use dedupe::Deduplicator;
pub use throttle::{RateLimiter, DEFAULT_MIN_INTERVAL};
pub use upstream::UpstreamClient;
