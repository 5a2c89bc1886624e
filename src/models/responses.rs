//! Response DTOs for the cache service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheDomain, CacheStats};

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    pub key: String,
    pub value: Value,
    /// Milliseconds until the entry expires
    pub ttl_remaining_ms: u64,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value, ttl_remaining_ms: u64) -> Self {
        Self {
            key: key.into(),
            value,
            ttl_remaining_ms,
        }
    }
}

/// Response body for `PUT /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    pub message: String,
    pub key: String,
    pub ttl_ms: u64,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, ttl_ms: u64) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
            ttl_ms,
        }
    }
}

/// Response body for `DELETE /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub message: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted", key),
            key,
        }
    }
}

/// Response body for `DELETE /cache`
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries dropped by the clear, expired ones included
    pub cleared: usize,
}

impl ClearResponse {
    pub fn new(cleared: usize) -> Self {
        Self {
            message: "Cache cleared".to_string(),
            cleared,
        }
    }
}

/// Response body for `GET /fetch/:domain/*path`
#[derive(Debug, Clone, Serialize)]
pub struct FetchResponse {
    pub domain: CacheDomain,
    pub key: String,
    pub value: Value,
}

/// Response body for the stats endpoint (`GET /stats`)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub writes: u64,
    pub persist_failures: u64,
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Whether writes reach the persistent mirror
    pub persistent: bool,
    /// Keys with an upstream request in flight
    pub in_flight: usize,
}

impl StatsResponse {
    pub fn new(stats: &CacheStats, persistent: bool, in_flight: usize) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            expirations: stats.expirations,
            writes: stats.writes,
            persist_failures: stats.persist_failures,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            persistent,
            in_flight,
        }
    }
}

/// One row of `GET /registry`
#[derive(Debug, Clone, Serialize)]
pub struct DomainInfo {
    pub domain: CacheDomain,
    pub prefix: &'static str,
    pub default_ttl_ms: u64,
}

/// Response body for `GET /registry`
#[derive(Debug, Clone, Serialize)]
pub struct RegistryResponse {
    pub domains: Vec<DomainInfo>,
}

impl RegistryResponse {
    pub fn current() -> Self {
        let domains = CacheDomain::ALL
            .into_iter()
            .map(|domain| DomainInfo {
                domain,
                prefix: domain.prefix(),
                default_ttl_ms: domain.default_ttl_ms(),
            })
            .collect();
        Self { domains }
    }
}

/// Response body for the health endpoint (`GET /health`)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_response_serialize() {
        let resp = GetResponse::new("price:wbtc", json!({"usd": 1}), 500);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            json!({"key": "price:wbtc", "value": {"usd": 1}, "ttl_remaining_ms": 500})
        );
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key", 1_000);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        for _ in 0..4 {
            stats.record_hit();
        }
        stats.record_miss();

        let resp = StatsResponse::new(&stats, true, 2);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
        assert!(resp.persistent);
        assert_eq!(resp.in_flight, 2);
    }

    #[test]
    fn test_registry_response_lists_every_domain() {
        let resp = RegistryResponse::current();
        assert_eq!(resp.domains.len(), CacheDomain::ALL.len());

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["domains"][0]["domain"], "price");
        assert_eq!(json["domains"][0]["default_ttl_ms"], 60_000);
    }

    #[test]
    fn test_fetch_response_uses_snake_case_domain() {
        let resp = FetchResponse {
            domain: CacheDomain::UserTransactions,
            key: "user_tx:0xabc".to_string(),
            value: json!([]),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["domain"], "user_transactions");
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Something went wrong"));
    }
}
