//! Persistent Mirror Module
//!
//! Snapshots the whole entry map into one blob of a [`KeyValueStorage`] so the
//! cache survives restarts. Persistence is advisory: memory stays
//! authoritative and callers of the store never see a mirror failure.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, KeyValueStorage};
use crate::error::StorageError;

/// Storage key the snapshot is written under.
pub const MIRROR_STORAGE_KEY: &str = "bitlazer-cache";

// == Persistent Mirror ==
/// Durable copy of the cache map.
///
/// A mirror without storage is disabled: loads return nothing and writes are
/// no-ops.
#[derive(Debug)]
pub struct PersistentMirror {
    storage: Option<Box<dyn KeyValueStorage>>,
    key: String,
}

impl PersistentMirror {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            storage: Some(Box::new(storage)),
            key: MIRROR_STORAGE_KEY.to_string(),
        }
    }

    /// In-memory-only mode.
    pub fn disabled() -> Self {
        Self {
            storage: None,
            key: MIRROR_STORAGE_KEY.to_string(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.storage.is_some()
    }

    // == Load ==
    /// Reads the snapshot once at startup.
    ///
    /// Storage that cannot be read disables the mirror for the rest of the
    /// process. A blob that does not parse is removed and the cache starts
    /// empty.
    pub fn load(&mut self) -> HashMap<String, CacheEntry> {
        let raw = match self.storage.as_ref().map(|s| s.get_item(&self.key)) {
            None => return HashMap::new(),
            Some(Ok(None)) => {
                debug!("No persisted cache snapshot found");
                return HashMap::new();
            }
            Some(Ok(Some(raw))) => raw,
            Some(Err(err)) => {
                warn!("Cache storage unavailable, running in-memory only: {}", err);
                self.storage = None;
                return HashMap::new();
            }
        };

        match serde_json::from_str::<HashMap<String, CacheEntry>>(&raw) {
            Ok(entries) => {
                info!("Restored {} cache entries from persistent mirror", entries.len());
                entries
            }
            Err(err) => {
                warn!("Discarding malformed cache snapshot: {}", err);
                if let Err(err) = self.remove() {
                    warn!("Failed to remove malformed cache snapshot: {}", err);
                }
                HashMap::new()
            }
        }
    }

    // == Save ==
    /// Rewrites the whole snapshot.
    pub fn save(&self, entries: &HashMap<String, CacheEntry>) -> Result<(), StorageError> {
        let Some(storage) = &self.storage else {
            return Ok(());
        };
        let raw = serde_json::to_string(entries)?;
        storage.set_item(&self.key, &raw)
    }

    // == Remove ==
    /// Deletes the snapshot blob entirely.
    pub fn remove(&self) -> Result<(), StorageError> {
        match &self.storage {
            Some(storage) => storage.remove_item(&self.key),
            None => Ok(()),
        }
    }
}
