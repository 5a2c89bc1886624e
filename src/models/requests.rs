//! Request DTOs for the cache service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Value;

/// Longest accepted cache key, in bytes.
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for `PUT /cache/:key`
///
/// # Fields
/// - `value`: Any JSON payload
/// - `ttl_ms`: Optional TTL in milliseconds (service default if absent)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub value: Value,
    #[serde(default)]
    pub ttl_ms: Option<u64>,
}

/// Query string for `GET /fetch/:domain/*path`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FetchQuery {
    /// Bypass a live cached value
    #[serde(default)]
    pub force: bool,
}

/// Query parameters consumed by `/fetch` itself rather than forwarded.
const FETCH_CONTROL_PARAMS: &[&str] = &["force"];

/// Returns the raw query of a `/fetch` request minus its control parameters,
/// in the original order and encoding. `None` when nothing is left to forward.
pub fn forwarded_query(raw: Option<&str>) -> Option<String> {
    let forwarded: Vec<&str> = raw
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let name = pair.split('=').next().unwrap_or_default();
            !FETCH_CONTROL_PARAMS.contains(&name)
        })
        .collect();

    if forwarded.is_empty() {
        None
    } else {
        Some(forwarded.join("&"))
    }
}

/// Validates a cache key taken from the path.
///
/// Returns an error message if validation fails, None if valid.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
