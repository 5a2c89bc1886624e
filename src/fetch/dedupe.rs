//! Request Deduplication
//!
//! Collapses concurrent requests for the same key into one producer run.
//! Every caller that arrives while a run is in flight joins it and receives
//! the same outcome.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use tokio::sync::Mutex;
use tracing::debug;

type InFlight<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;

// == Deduplicator ==
/// Single-flight map from key to the in-flight producer run.
///
/// Outcomes are cloned out to every joined caller, hence the `Clone` bounds.
pub struct Deduplicator<T, E> {
    pending: Arc<Mutex<HashMap<String, InFlight<T, E>>>>,
}

impl<T, E> Deduplicator<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    // == Debounced Fetch ==
    /// Joins the in-flight run for `key`, or starts `producer` as the new one.
    ///
    /// The pending entry is removed when the run settles, success or failure,
    /// before any caller observes the result.
    pub async fn debounced_fetch<F, Fut>(&self, key: &str, producer: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let in_flight = {
            let mut pending = self.pending.lock().await;

            match pending.get(key) {
                Some(existing) => {
                    debug!("Joining in-flight request for {}", key);
                    existing.clone()
                }
                None => {
                    let run = producer();
                    let registry = Arc::clone(&self.pending);
                    let owned_key = key.to_string();

                    let shared = async move {
                        let result = run.await;
                        registry.lock().await.remove(&owned_key);
                        result
                    }
                    .boxed()
                    .shared();

                    pending.insert(key.to_string(), shared.clone());
                    shared
                }
            }
        };

        in_flight.await
    }

    /// Number of keys with a run in flight.
    pub async fn in_flight(&self) -> usize {
        self.pending.lock().await.len()
    }
}

impl<T, E> Default for Deduplicator<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Clone for Deduplicator<T, E> {
    fn clone(&self) -> Self {
        Self {
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<T, E> fmt::Debug for Deduplicator<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deduplicator").finish_non_exhaustive()
    }
}
