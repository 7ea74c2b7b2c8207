//! Ordered provider chain.

use async_trait::async_trait;
use regime_odds_core::{CoinList, HistoryConfig, PriceHistoryProvider, PriceSeries, ProviderError};
use std::sync::Arc;

use crate::coingecko::CoinGeckoProvider;
use crate::cryptocompare::CryptoCompareProvider;

/// Tries providers in order; the first series with at least
/// `min_observations` points wins.
///
/// When every provider fails, the last data error (short, malformed,
/// unsupported) is returned in preference to transport failures.
pub struct FallbackHistory {
    providers: Vec<Arc<dyn PriceHistoryProvider>>,
    min_observations: usize,
}

impl FallbackHistory {
    #[must_use]
    pub fn new(providers: Vec<Arc<dyn PriceHistoryProvider>>, min_observations: usize) -> Self {
        Self {
            providers,
            min_observations,
        }
    }

    /// CryptoCompare first, then CoinGecko.
    #[must_use]
    pub fn from_config(config: &HistoryConfig, coins: &CoinList) -> Self {
        let providers: Vec<Arc<dyn PriceHistoryProvider>> = vec![
            Arc::new(CryptoCompareProvider::new(config)),
            Arc::new(CoinGeckoProvider::new(config, coins)),
        ];
        Self::new(providers, config.min_observations)
    }

    #[must_use]
    pub fn providers(&self) -> &[Arc<dyn PriceHistoryProvider>] {
        &self.providers
    }
}

#[async_trait]
impl PriceHistoryProvider for FallbackHistory {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, ProviderError> {
        let mut last_error: Option<ProviderError> = None;

        for provider in &self.providers {
            let err = match provider.fetch(symbol).await {
                Ok(series) if series.len() >= self.min_observations => {
                    tracing::info!(
                        symbol,
                        provider = provider.name(),
                        observations = series.len(),
                        "history provider selected"
                    );
                    return Ok(series);
                }
                Ok(series) => ProviderError::Insufficient {
                    got: series.len(),
                    required: self.min_observations,
                },
                Err(err) => err,
            };

            if err.is_transient() {
                tracing::warn!(
                    symbol,
                    provider = provider.name(),
                    error = %err,
                    "history provider unreachable, trying next provider"
                );
                if last_error.as_ref().map_or(true, ProviderError::is_transient) {
                    last_error = Some(err);
                }
            } else {
                tracing::warn!(
                    symbol,
                    provider = provider.name(),
                    error = %err,
                    "no usable history, trying next provider"
                );
                last_error = Some(err);
            }
        }

        Err(last_error.unwrap_or(ProviderError::Empty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use regime_odds_core::PriceObservation;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed {
        name: &'static str,
        outcome: Result<usize, fn() -> ProviderError>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn points(name: &'static str, n: usize) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Ok(n),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, err: fn() -> ProviderError) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Err(err),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PriceHistoryProvider for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, _symbol: &str) -> Result<PriceSeries, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(n) => {
                    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
                    Ok((0..n)
                        .map(|i| PriceObservation::new(start + Duration::hours(i as i64), 100.0))
                        .collect())
                }
                Err(make) => Err(make()),
            }
        }
    }

    fn chain(providers: Vec<Arc<Fixed>>, min: usize) -> FallbackHistory {
        FallbackHistory::new(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn PriceHistoryProvider>)
                .collect(),
            min,
        )
    }

    #[tokio::test]
    async fn first_sufficient_provider_wins() {
        let first = Fixed::points("first", 1_200);
        let second = Fixed::points("second", 5_000);
        let history = chain(vec![Arc::clone(&first), Arc::clone(&second)], 1_000);

        let series = history.fetch("BTC").await.unwrap();
        assert_eq!(series.len(), 1_200);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exactly_the_minimum_is_enough() {
        let history = chain(vec![Fixed::points("only", 1_000)], 1_000);
        assert_eq!(history.fetch("BTC").await.unwrap().len(), 1_000);
    }

    #[tokio::test]
    async fn falls_back_on_failure_and_short_history() {
        let history = chain(
            vec![
                Fixed::failing("down", || ProviderError::Network("refused".to_string())),
                Fixed::points("short", 10),
                Fixed::points("good", 2_000),
            ],
            1_000,
        );
        assert_eq!(history.fetch("ETH").await.unwrap().len(), 2_000);
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let history = chain(
            vec![
                Fixed::failing("down", || ProviderError::Timeout("15s".to_string())),
                Fixed::points("short", 999),
            ],
            1_000,
        );
        let err = history.fetch("SOL").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Insufficient {
                got: 999,
                required: 1_000
            }
        ));
    }

    #[tokio::test]
    async fn data_error_outranks_later_transport_failure() {
        let history = chain(
            vec![
                Fixed::failing("unknown", || ProviderError::Unsupported("DOGE".to_string())),
                Fixed::failing("down", || ProviderError::Timeout("15s".to_string())),
                Fixed::failing("gateway", || ProviderError::Status {
                    status: 502,
                    body: String::new(),
                }),
            ],
            1_000,
        );
        let err = history.fetch("DOGE").await.unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(err, ProviderError::Unsupported(_)));
    }

    #[tokio::test]
    async fn only_transport_failures_return_the_last_one() {
        let history = chain(
            vec![
                Fixed::failing("down", || ProviderError::Network("refused".to_string())),
                Fixed::failing("slow", || ProviderError::Timeout("15s".to_string())),
            ],
            1_000,
        );
        let err = history.fetch("BTC").await.unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(err, ProviderError::Timeout(_)));
    }

    #[tokio::test]
    async fn empty_chain_is_empty() {
        let history = chain(Vec::new(), 1_000);
        assert!(matches!(history.fetch("BTC").await, Err(ProviderError::Empty)));
    }

    #[test]
    fn config_chain_order() {
        let history = FallbackHistory::from_config(&HistoryConfig::default(), &CoinList::default());
        let names: Vec<&str> = history.providers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["cryptocompare", "coingecko"]);
    }
}
