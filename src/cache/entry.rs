//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with its payload and freshness metadata.
///
/// This is also the on-disk shape of one entry inside the persistent mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The stored payload
    pub value: Value,
    /// Write timestamp (Unix milliseconds)
    pub stored_at: u64,
    /// Time-to-live in milliseconds
    pub ttl_ms: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped at `now_ms`.
    pub fn new(value: Value, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            value,
            stored_at: now_ms,
            ttl_ms,
        }
    }

    // == Is Live ==
    /// Checks if the entry is still fresh at `now_ms`.
    ///
    /// Boundary condition: an entry whose age equals its TTL is still live; it
    /// only expires once the age strictly exceeds the TTL. A clock that went
    /// backwards yields an age of zero.
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.stored_at) <= self.ttl_ms
    }

    // == Time To Live ==
    /// Returns the remaining TTL in milliseconds, `0` once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        let expires_at = self.stored_at.saturating_add(self.ttl_ms);
        expires_at.saturating_sub(now_ms)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"v": 1}), 1_000, 500);

        assert_eq!(entry.value, json!({"v": 1}));
        assert_eq!(entry.stored_at, 1_000);
        assert_eq!(entry.ttl_ms, 500);
        assert!(entry.is_live(1_000));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(json!("x"), 0, 1_000);

        assert!(entry.is_live(999));
        assert!(!entry.is_live(1_500));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(json!("x"), 0, 1_000);

        assert!(entry.is_live(1_000), "Entry should still be live at exactly its TTL");
        assert!(!entry.is_live(1_001), "Entry should expire one ms past its TTL");
    }

    #[test]
    fn test_zero_ttl_is_live_only_at_write_time() {
        let entry = CacheEntry::new(json!(null), 42, 0);

        assert!(entry.is_live(42));
        assert!(!entry.is_live(43));
    }

    #[test]
    fn test_clock_going_backwards_keeps_entry_live() {
        let entry = CacheEntry::new(json!(1), 10_000, 100);
        assert!(entry.is_live(5_000));
    }

    #[test]
    fn test_ttl_remaining_ms() {
        let entry = CacheEntry::new(json!(1), 1_000, 10_000);

        assert_eq!(entry.ttl_remaining_ms(1_000), 10_000);
        assert_eq!(entry.ttl_remaining_ms(6_000), 5_000);
        assert_eq!(entry.ttl_remaining_ms(20_000), 0);
    }

    #[test]
    fn test_entry_serialized_shape() {
        let entry = CacheEntry::new(json!({"ok": 1}), 7, 9);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json, json!({"value": {"ok": 1}, "stored_at": 7, "ttl_ms": 9}));
    }
}
