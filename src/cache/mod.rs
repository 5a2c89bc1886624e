//! Cache Module
//!
//! In-memory TTL cache with lazy expiration, mirrored to durable storage.

mod clock;
mod entry;
mod mirror;
mod registry;
mod stats;
mod storage;
mod store;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use mirror::{PersistentMirror, MIRROR_STORAGE_KEY};
pub use registry::CacheDomain;
pub use stats::CacheStats;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::CacheStore;

/// Process-wide handle to one cache store.
pub type SharedCache = Arc<RwLock<CacheStore>>;

/// Wraps a store for sharing across tasks.
pub fn shared(store: CacheStore) -> SharedCache {
    Arc::new(RwLock::new(store))
}
