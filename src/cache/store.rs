//! Cache Store Module
//!
//! Main cache engine: HashMap storage with lazy TTL expiration, mirrored to a
//! persistent snapshot after every mutation.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, Clock, PersistentMirror, SystemClock};

// == Cache Store ==
/// TTL cache with a best-effort persistent mirror.
///
/// None of the operations fail. Expired entries are only removed when a read
/// finds them; there is no background sweep.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Durable snapshot of `entries`
    mirror: PersistentMirror,
    /// Time source for stamping and aging entries
    clock: Arc<dyn Clock>,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an in-memory-only store on the system clock.
    pub fn new() -> Self {
        Self::open(PersistentMirror::disabled(), Arc::new(SystemClock))
    }

    /// Creates an in-memory-only store on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self::open(PersistentMirror::disabled(), clock)
    }

    /// Creates a store seeded from the mirror's snapshot.
    pub fn open(mut mirror: PersistentMirror, clock: Arc<dyn Clock>) -> Self {
        let entries = mirror.load();
        let mut stats = CacheStats::new();
        stats.set_total_entries(entries.len());

        Self {
            entries,
            mirror,
            clock,
            stats,
        }
    }

    // == Get ==
    /// Returns the value for `key` if it is live.
    ///
    /// An expired entry is removed (from memory and the mirror) and reported
    /// as absent.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_ms();

        let live = match self.entries.get(key) {
            Some(entry) if entry.is_live(now) => Some(entry.value.clone()),
            Some(_) => None,
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if live.is_some() {
            self.stats.record_hit();
            return live;
        }

        // Lazy eviction
        self.entries.remove(key);
        self.stats.record_expiration();
        self.stats.set_total_entries(self.entries.len());
        debug!("Evicted expired cache entry: {}", key);
        self.persist();
        None
    }

    /// Typed [`get`](Self::get).
    ///
    /// A live value that does not decode as `T` is reported as absent and
    /// left in place.
    pub fn get_as<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(typed) => Some(typed),
            Err(err) => {
                warn!("Cached value for {} has unexpected shape: {}", key, err);
                None
            }
        }
    }

    // == Set ==
    /// Stores `value` under `key`, overwriting any previous entry and
    /// restarting its TTL.
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl_ms: u64) {
        let entry = CacheEntry::new(value, self.clock.now_ms(), ttl_ms);
        self.entries.insert(key.into(), entry);
        self.stats.record_write();
        self.stats.set_total_entries(self.entries.len());
        self.persist();
    }

    /// Typed [`set`](Self::set).
    ///
    /// Only fails if `value` cannot be represented as JSON, in which case the
    /// cache is left untouched.
    pub fn set_as<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
        ttl_ms: u64,
    ) -> serde_json::Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value, ttl_ms);
        Ok(())
    }

    // == Delete ==
    /// Removes `key` if present. Deleting an absent key is a no-op.
    pub fn delete(&mut self, key: &str) {
        self.entries.remove(key);
        self.stats.set_total_entries(self.entries.len());
        self.persist();
    }

    // == Clear ==
    /// Drops every entry and removes the persisted snapshot itself.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.set_total_entries(0);
        if let Err(err) = self.mirror.remove() {
            self.stats.record_persist_failure();
            warn!("Failed to remove cache snapshot: {}", err);
        }
    }

    // == Peek ==
    /// Returns the raw entry without any expiry handling.
    pub fn peek(&self, key: &str) -> Option<&CacheEntry> {
        self.entries.get(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// True while writes are mirrored to durable storage.
    pub fn is_persistent(&self) -> bool {
        self.mirror.is_enabled()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Mirror failures are logged and counted, never returned.
    // The rewrite is synchronous and runs under the caller's write guard, so
    // with `FileStorage` each mutation costs a full snapshot write and rename
    // on the async worker thread.
    fn persist(&mut self) {
        if let Err(err) = self.mirror.save(&self.entries) {
            self.stats.record_persist_failure();
            warn!("Failed to persist cache snapshot: {}", err);
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{KeyValueStorage, ManualClock, MemoryStorage, MIRROR_STORAGE_KEY};
    use serde::Deserialize;
    use serde_json::json;

    fn manual_store() -> (CacheStore, ManualClock) {
        let clock = ManualClock::new(0);
        let store = CacheStore::with_clock(Arc::new(clock.clone()));
        (store, clock)
    }

    fn mirrored_store(storage: &MemoryStorage, clock: &ManualClock) -> CacheStore {
        CacheStore::open(
            PersistentMirror::new(storage.clone()),
            Arc::new(clock.clone()),
        )
    }

    fn snapshot(storage: &MemoryStorage) -> Option<HashMap<String, CacheEntry>> {
        storage
            .get_item(MIRROR_STORAGE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert!(!store.is_persistent());
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _clock) = manual_store();

        store.set("k", json!({"v": 1}), 1_000);

        assert_eq!(store.get("k"), Some(json!({"v": 1})));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _clock) = manual_store();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let (mut store, clock) = manual_store();

        store.set("k", json!({"v": 1}), 1_000);
        assert_eq!(store.get("k"), Some(json!({"v": 1})));

        clock.set(1_500);
        assert_eq!(store.get("k"), None);
        assert!(store.peek("k").is_none(), "Expired entry should be evicted by the read");
    }

    #[test]
    fn test_store_expired_entry_lingers_until_read() {
        let (mut store, clock) = manual_store();

        store.set("k", json!(1), 100);
        clock.advance(1_000);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("k"), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_store_overwrite_resets_ttl() {
        let (mut store, clock) = manual_store();

        store.set("k", json!("old"), 1_000);
        clock.set(900);
        store.set("k", json!("new"), 1_000);
        clock.set(1_800);

        assert_eq!(store.get("k"), Some(json!("new")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _clock) = manual_store();

        store.set("k", json!(1), 1_000);
        store.delete("k");

        assert!(store.is_empty());
        assert_eq!(store.get("k"), None);
    }

    #[test]
    fn test_store_delete_nonexistent_is_noop() {
        let (mut store, _clock) = manual_store();

        store.delete("nonexistent");
        store.delete("nonexistent");
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear_is_idempotent() {
        let (mut store, _clock) = manual_store();

        store.set("a", json!(1), 1_000);
        store.set("b", json!(2), 1_000);
        store.clear();
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.get("a"), None);
    }

    #[test]
    fn test_store_typed_roundtrip() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Supply {
            total: u64,
            symbol: String,
        }

        let (mut store, _clock) = manual_store();
        let supply = Supply {
            total: 21_000_000,
            symbol: "lzrBTC".to_string(),
        };

        store.set_as("supply", &supply, 300_000).unwrap();
        assert_eq!(store.get_as::<Supply>("supply"), Some(supply));
    }

    #[test]
    fn test_store_get_as_wrong_shape_is_absent() {
        let (mut store, _clock) = manual_store();

        store.set("k", json!("a string"), 1_000);
        assert_eq!(store.get_as::<u64>("k"), None);
        assert_eq!(store.get("k"), Some(json!("a string")));
    }

    #[test]
    fn test_store_stats() {
        let (mut store, clock) = manual_store();

        store.set("k", json!(1), 100);
        store.get("k");
        store.get("missing");
        clock.advance(200);
        store.get("k");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.total_entries, 0);
    }

    #[test]
    fn test_store_mirrors_every_mutation() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(0);
        let mut store = mirrored_store(&storage, &clock);

        store.set("a", json!(1), 100);
        store.set("b", json!(2), 10_000);
        assert_eq!(snapshot(&storage).unwrap().len(), 2);

        store.delete("b");
        assert_eq!(snapshot(&storage).unwrap().len(), 1);

        clock.advance(500);
        assert_eq!(store.get("a"), None);
        assert!(snapshot(&storage).unwrap().is_empty());
    }

    #[test]
    fn test_store_clear_removes_snapshot() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(0);
        let mut store = mirrored_store(&storage, &clock);

        store.set("a", json!(1), 100);
        store.clear();

        assert_eq!(storage.get_item(MIRROR_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_store_restores_from_snapshot() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(0);

        {
            let mut store = mirrored_store(&storage, &clock);
            store.set("price:wbtc", json!({"usd": 64000}), 60_000);
        }

        let mut reopened = mirrored_store(&storage, &clock);
        assert_eq!(reopened.len(), 1);
        assert_eq!(reopened.get("price:wbtc"), Some(json!({"usd": 64000})));
    }

    #[test]
    fn test_store_restored_entries_keep_their_age() {
        let storage = MemoryStorage::new();
        let clock = ManualClock::new(0);
        mirrored_store(&storage, &clock).set("k", json!(1), 1_000);

        clock.set(5_000);
        let mut reopened = mirrored_store(&storage, &clock);
        assert_eq!(reopened.get("k"), None);
    }

    #[test]
    fn test_store_malformed_snapshot_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set_item(MIRROR_STORAGE_KEY, "[1, 2").unwrap();

        let store = mirrored_store(&storage, &ManualClock::new(0));
        assert!(store.is_empty());
        assert!(store.is_persistent());
        assert_eq!(storage.get_item(MIRROR_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn test_store_unavailable_storage_runs_in_memory() {
        let storage = MemoryStorage::new();
        storage.set_available(false);

        let mut store = mirrored_store(&storage, &ManualClock::new(0));
        assert!(!store.is_persistent());

        store.set("k", json!(1), 1_000);
        assert_eq!(store.get("k"), Some(json!(1)));
        assert_eq!(store.stats().persist_failures, 0);
    }

    #[test]
    fn test_store_quota_failure_keeps_memory_authoritative() {
        let storage = MemoryStorage::with_quota(128);
        let mut store = mirrored_store(&storage, &ManualClock::new(0));

        store.set("small", json!(1), 1_000);
        store.set("big", json!("x".repeat(256)), 1_000);

        assert_eq!(store.get("big"), Some(json!("x".repeat(256))));
        assert_eq!(store.get("small"), Some(json!(1)));
        assert_eq!(store.stats().persist_failures, 1);
        // Snapshot still holds the last successful write
        assert_eq!(snapshot(&storage).unwrap().len(), 1);
    }

    #[test]
    fn test_store_write_failure_after_start_is_swallowed() {
        let storage = MemoryStorage::new();
        let mut store = mirrored_store(&storage, &ManualClock::new(0));

        storage.set_available(false);
        store.set("k", json!(1), 1_000);
        store.delete("other");
        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.stats().persist_failures, 3);
        assert!(store.is_persistent());
    }
}
