//! Rate Limiting
//!
//! Spaces out producer runs that share a key. Early callers are delayed,
//! never dropped.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// Default spacing between runs under one key.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

/// Start time of the most recent run under one key.
type Slot = Arc<Mutex<Option<Instant>>>;

// == Rate Limiter ==
/// Per-key minimum interval between producer starts.
///
/// A caller holds its key's slot while it waits, and stamps the slot with the
/// moment it actually starts. The slot mutex is fair, so concurrent callers
/// start in arrival order, each at least one interval after the previous
/// start even when a waiter wakes late. Keys never expire.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    min_interval: Duration,
    slots: Arc<Mutex<HashMap<String, Slot>>>,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    // == Throttle ==
    /// Runs `producer` once at least `min_interval` has passed since the
    /// previous start under `key`. Other keys are not held up.
    pub async fn throttle<T, F, Fut>(&self, key: &str, producer: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let slot = {
            let mut slots = self.slots.lock().await;
            Arc::clone(slots.entry(key.to_string()).or_default())
        };

        {
            let mut last_start = slot.lock().await;
            if let Some(last) = *last_start {
                let elapsed = last.elapsed();
                if elapsed < self.min_interval {
                    let delay = self.min_interval - elapsed;
                    debug!("Rate limiting {}: delaying {:?}", key, delay);
                    sleep(delay).await;
                }
            }
            *last_start = Some(Instant::now());
        }

        producer().await
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
