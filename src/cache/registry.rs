//! Cache Domain Registry
//!
//! The fixed set of logical cache domains, their key prefixes and default
//! TTLs. Every call site builds keys through [`CacheDomain::key`] so unrelated
//! features never collide in the shared key namespace.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;

use crate::error::CacheError;

const SECOND: u64 = 1_000;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

/// Logical cache domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheDomain {
    /// WBTC / lzrBTC price quotes
    Price,
    TokenSupply,
    StakingStats,
    StakingApr,
    /// Block height and gas on the L2/L3
    NetworkStats,
    WrapActivity,
    BridgeActivity,
    StakingActivity,
    /// Per-address transaction feeds
    UserTransactions,
    LastTransaction,
    /// Full transaction lists; large and slow to rebuild
    TransactionHistory,
}

impl CacheDomain {
    pub const ALL: [CacheDomain; 11] = [
        CacheDomain::Price,
        CacheDomain::TokenSupply,
        CacheDomain::StakingStats,
        CacheDomain::StakingApr,
        CacheDomain::NetworkStats,
        CacheDomain::WrapActivity,
        CacheDomain::BridgeActivity,
        CacheDomain::StakingActivity,
        CacheDomain::UserTransactions,
        CacheDomain::LastTransaction,
        CacheDomain::TransactionHistory,
    ];

    pub const fn prefix(self) -> &'static str {
        match self {
            CacheDomain::Price => "price",
            CacheDomain::TokenSupply => "supply",
            CacheDomain::StakingStats => "stats",
            CacheDomain::StakingApr => "apr",
            CacheDomain::NetworkStats => "network",
            CacheDomain::WrapActivity => "wrap_activity",
            CacheDomain::BridgeActivity => "bridge_activity",
            CacheDomain::StakingActivity => "staking_activity",
            CacheDomain::UserTransactions => "user_tx",
            CacheDomain::LastTransaction => "last_tx",
            CacheDomain::TransactionHistory => "tx_history",
        }
    }

    pub const fn default_ttl_ms(self) -> u64 {
        match self {
            CacheDomain::NetworkStats => 15 * SECOND,
            CacheDomain::UserTransactions | CacheDomain::LastTransaction => 30 * SECOND,
            CacheDomain::Price
            | CacheDomain::WrapActivity
            | CacheDomain::BridgeActivity
            | CacheDomain::StakingActivity => MINUTE,
            CacheDomain::StakingApr => 2 * MINUTE,
            CacheDomain::TokenSupply | CacheDomain::StakingStats => 5 * MINUTE,
            CacheDomain::TransactionHistory => 24 * HOUR,
        }
    }

    pub const fn default_ttl(self) -> Duration {
        Duration::from_millis(self.default_ttl_ms())
    }

    /// Builds `<prefix>:<discriminator>`, or the bare prefix when the
    /// discriminator is empty.
    pub fn key(self, discriminator: &str) -> String {
        if discriminator.is_empty() {
            self.prefix().to_string()
        } else {
            format!("{}:{}", self.prefix(), discriminator)
        }
    }
}

impl fmt::Display for CacheDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for CacheDomain {
    type Err = CacheError;

    /// Parses a key prefix (`"price"`, `"user_tx"`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CacheDomain::ALL
            .into_iter()
            .find(|domain| domain.prefix() == s)
            .ok_or_else(|| CacheError::UnknownDomain(s.to_string()))
    }
}
