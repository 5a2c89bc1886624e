//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// TTL in milliseconds for fetched values when the caller picks none
    pub default_ttl_ms: u64,
    /// Minimum spacing in milliseconds between upstream calls per domain
    pub rate_limit_interval_ms: u64,
    /// Directory for the persistent mirror; `None` runs in-memory only
    pub mirror_dir: Option<PathBuf>,
    /// Base URL of the upstream explorer/price API
    pub upstream_base_url: Option<String>,
    /// Per-request upstream timeout in milliseconds
    pub upstream_timeout_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `DEFAULT_TTL_MS` - Default fetch TTL in ms (default: 300000)
    /// - `RATE_LIMIT_INTERVAL_MS` - Upstream spacing in ms (default: 1000)
    /// - `MIRROR_DIR` - Persistent mirror directory (default: unset)
    /// - `UPSTREAM_BASE_URL` - Upstream API base URL (default: unset)
    /// - `UPSTREAM_TIMEOUT_MS` - Upstream timeout in ms (default: 10000)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            rate_limit_interval_ms: parse_var("RATE_LIMIT_INTERVAL_MS")
                .unwrap_or(defaults.rate_limit_interval_ms),
            mirror_dir: non_empty_var("MIRROR_DIR").map(PathBuf::from),
            upstream_base_url: non_empty_var("UPSTREAM_BASE_URL"),
            upstream_timeout_ms: parse_var("UPSTREAM_TIMEOUT_MS")
                .unwrap_or(defaults.upstream_timeout_ms),
        }
    }

    pub fn rate_limit_interval(&self) -> Duration {
        Duration::from_millis(self.rate_limit_interval_ms)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_millis(self.upstream_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            default_ttl_ms: 300_000,
            rate_limit_interval_ms: 1_000,
            mirror_dir: None,
            upstream_base_url: None,
            upstream_timeout_ms: 10_000,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
