//! Process-wide memoization of expensive per-key computations.
//!
//! Each key owns an async once-cell, so concurrent callers asking for the
//! same key share one computation. Failed computations leave the cell empty
//! and the next caller retries.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::OnceCell;

use regime_odds_core::PriceSeries;

use crate::probability::SimulationResult;

/// Identity of a simulation: symbol (uppercased) and horizon in hours.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SimulationKey {
    pub symbol: String,
    pub horizon_hours: u32,
}

impl SimulationKey {
    #[must_use]
    pub fn new(symbol: &str, horizon_hours: u32) -> Self {
        Self {
            symbol: symbol.to_ascii_uppercase(),
            horizon_hours,
        }
    }
}

/// Memoizes one value per key for the lifetime of the cache.
pub struct KeyedCache<K, V> {
    cells: Mutex<HashMap<K, Arc<OnceCell<Arc<V>>>>>,
}

impl<K, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self {
            cells: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> KeyedCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn cell(&self, key: &K) -> Arc<OnceCell<Arc<V>>> {
        let mut cells = self.cells.lock();
        Arc::clone(cells.entry(key.clone()).or_default())
    }

    /// Returns the cached value, or runs `init` once for this key.
    ///
    /// # Errors
    /// Propagates the error of `init`; nothing is cached in that case.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: &K, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.cell(key);
        let value = cell
            .get_or_try_init(|| async move { init().await.map(Arc::new) })
            .await?;
        Ok(Arc::clone(value))
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.cells.lock().get(key).and_then(|cell| cell.get().cloned())
    }

    /// Number of keys holding a computed value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Simulated return vectors by (symbol, horizon).
pub type SimulationCache = KeyedCache<SimulationKey, SimulationResult>;

/// Price histories by uppercased symbol.
pub type HistoryCache = KeyedCache<String, PriceSeries>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn key_normalizes_symbol() {
        assert_eq!(SimulationKey::new("btc", 24), SimulationKey::new("BTC", 24));
        assert_ne!(SimulationKey::new("BTC", 24), SimulationKey::new("BTC", 12));
    }

    #[tokio::test]
    async fn computes_once_per_key() {
        let cache: KeyedCache<String, u32> = KeyedCache::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_try_init(&"a".to_string(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(7)
                })
                .await
                .unwrap();
            assert_eq!(*value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let cache: KeyedCache<&'static str, u32> = KeyedCache::new();

        let first = cache
            .get_or_try_init(&"k", || async { Err::<u32, _>("boom") })
            .await;
        assert_eq!(first.unwrap_err(), "boom");
        assert!(cache.get(&"k").is_none());
        assert!(cache.is_empty());

        let second = cache
            .get_or_try_init(&"k", || async { Ok::<_, &str>(3) })
            .await
            .unwrap();
        assert_eq!(*second, 3);
    }
}
