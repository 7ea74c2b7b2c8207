//! End-to-end tests of the cached engine over an in-memory history provider.

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regime_odds_core::{
    EngineConfig, PriceHistoryProvider, PriceObservation, PriceSeries, ProviderError,
};
use regime_odds_engine::{simulate_regime, EngineError, RegimeEngine, OPEN_ENDED_HIGH};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct InMemoryProvider {
    series: Option<PriceSeries>,
    calls: AtomicUsize,
}

impl InMemoryProvider {
    fn with_series(series: PriceSeries) -> Arc<Self> {
        Arc::new(Self {
            series: Some(series),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            series: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for InMemoryProvider {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn fetch(&self, _symbol: &str) -> Result<PriceSeries, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.series
            .clone()
            .ok_or_else(|| ProviderError::Network("connection refused".to_string()))
    }
}

fn synthetic_series(len: usize, seed: u64) -> PriceSeries {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    let mut price = 30_000.0;
    (0..len)
        .map(|i| {
            let step: f64 = rng.gen_range(-0.008..0.008);
            price *= 1.0 + step;
            PriceObservation::new(start + Duration::hours(i as i64), price)
        })
        .collect()
}

fn engine_over(provider: Arc<InMemoryProvider>) -> RegimeEngine {
    RegimeEngine::new(provider, EngineConfig::default())
}

#[tokio::test]
async fn above_probabilities_are_percentages_and_monotone() {
    let series = synthetic_series(4_000, 11);
    let spot = series.last_close().unwrap();
    let engine = engine_over(InMemoryProvider::with_series(series));

    let mut previous = 100.0;
    for pct in [-0.10, -0.05, -0.02, 0.0, 0.02, 0.05, 0.10] {
        let p = engine
            .probability_above("BTC", 12, spot * (1.0 + pct))
            .await
            .expect("simulation available");
        assert!((0.0..=100.0).contains(&p));
        assert!(p <= previous, "{p} > {previous} at {pct}");
        previous = p;
    }

    let deep_itm = engine.probability_above("BTC", 12, spot * 0.5).await.unwrap();
    assert!((deep_itm - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn history_and_simulation_are_cached() {
    let provider = InMemoryProvider::with_series(synthetic_series(3_000, 12));
    let engine = engine_over(Arc::clone(&provider));

    let first = engine.simulation("btc", 6).await.unwrap();
    let second = engine.simulation("BTC", 6).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    engine.probability_above("BTC", 6, 30_000.0).await.unwrap();
    engine.probability_range("BTC", 6, 29_000.0, 31_000.0).await.unwrap();
    engine.simulation("BTC", 10).await.unwrap();

    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn range_partition_sums_to_one_hundred() {
    let series = synthetic_series(3_000, 13);
    let spot = series.last_close().unwrap();
    let engine = engine_over(InMemoryProvider::with_series(series));

    let low = spot * 0.98;
    let high = spot * 1.02;
    let below = engine.probability_range("ETH", 24, 0.0, low).await.unwrap();
    let inside = engine.probability_range("ETH", 24, low, high).await.unwrap();
    let above = engine
        .probability_range("ETH", 24, high, OPEN_ENDED_HIGH)
        .await
        .unwrap();
    let at_high = engine.probability_above("ETH", 24, high).await.unwrap();

    assert!((below + inside + above - 100.0).abs() < 1e-6);
    // `Above` is strict while probability_above counts the strike itself.
    assert!(above <= at_high);
}

#[tokio::test]
async fn short_history_yields_none() {
    let engine = engine_over(InMemoryProvider::with_series(synthetic_series(150, 14)));
    assert!(engine.probability_above("SOL", 24, 100.0).await.is_none());
    assert!(engine.probability_range("SOL", 24, 90.0, 110.0).await.is_none());
}

#[tokio::test]
async fn provider_failure_yields_none_and_is_retried() {
    let provider = InMemoryProvider::failing();
    let engine = engine_over(Arc::clone(&provider));

    assert!(engine.probability_above("XRP", 4, 0.5).await.is_none());
    assert!(engine.probability_above("XRP", 4, 0.5).await.is_none());
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn identical_engines_agree() {
    let series = synthetic_series(2_500, 15);
    let a = engine_over(InMemoryProvider::with_series(series.clone()));
    let b = engine_over(InMemoryProvider::with_series(series));

    let sa = a.simulation("BTC", 8).await.unwrap();
    let sb = b.simulation("BTC", 8).await.unwrap();
    assert_eq!(sa.returns, sb.returns);
    assert_eq!(sa.diagnostics.regime_bins, sb.diagnostics.regime_bins);
}

/// Hourly series whose 96h momentum is `0.15 * sin(2πi/192)` in log terms,
/// ending with `surge_hours` of compounding `rate` growth. The final
/// momentum sits far above anything seen before, in the top bin.
fn surging_series(rate: f64, surge_hours: usize) -> PriceSeries {
    const PERIOD: f64 = 192.0;
    const AMPLITUDE: f64 = 0.075;
    let len = 192 * 16 + 1;
    let surge_start = len - 1 - surge_hours;
    let start = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
    (0..len)
        .map(|i| {
            let phase = 2.0 * std::f64::consts::PI * i as f64 / PERIOD;
            let surge = (1.0 + rate).powi(i.saturating_sub(surge_start) as i32);
            let close = 30_000.0 * (AMPLITUDE * phase.sin()).exp() * surge;
            PriceObservation::new(start + Duration::hours(i as i64), close)
        })
        .collect()
}

#[test]
fn isolated_top_bin_expands_the_regime() {
    let series = surging_series(0.01, 20);
    let config = EngineConfig::default();
    let sim = simulate_regime(&series, 24, &config).unwrap();
    let d = &sim.diagnostics;

    assert_eq!(d.current_bin, d.profile.n_bins - 1);
    // Neighbours alone hold no completed forward window.
    assert!(d.regime_bins.len() > 3, "{:?}", d.regime_bins);
    assert!(d.regime_bins.len() <= config.max_expansion_bins);
    assert_eq!(d.regime_bins.last(), Some(&d.current_bin));
    assert!(d.pool_size >= d.profile.min_samples);
    assert_eq!(sim.returns.len(), d.profile.n_sim);
}

#[tokio::test]
async fn exhausted_expansion_is_insufficient_data() {
    let series = surging_series(0.02, 20);
    let spot = series.last_close().unwrap();

    let err = simulate_regime(&series, 24, &EngineConfig::default()).unwrap_err();
    assert!(
        matches!(
            err,
            EngineError::InsufficientRegimeData {
                samples: 0,
                required: 50
            }
        ),
        "{err}"
    );

    let provider = InMemoryProvider::with_series(series);
    let engine = engine_over(Arc::clone(&provider));
    assert!(engine.probability_above("BTC", 24, spot).await.is_none());
    assert!(engine.simulation("BTC", 24).await.unwrap_err().is_insufficient_data());
    // The history stays cached while the failed simulation is retried.
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn surge_with_history_behind_it_is_priced() {
    let series = surging_series(0.01, 20);
    let spot = series.last_close().unwrap();
    let engine = engine_over(InMemoryProvider::with_series(series));

    let p = engine.probability_above("BTC", 24, spot).await.unwrap();
    assert!((0.0..=100.0).contains(&p));
}
