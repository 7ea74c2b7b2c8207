//! Regime-conditioned simulation pipeline and its cached async front end.

use regime_odds_core::{EngineConfig, PriceHistoryProvider, PriceSeries};
use std::sync::Arc;

use crate::binning::MomentumBinning;
use crate::cache::{HistoryCache, SimulationCache, SimulationKey};
use crate::error::EngineError;
use crate::forward::{window_values, ForwardReturnExtractor};
use crate::horizon::HorizonProfile;
use crate::momentum::MomentumSeries;
use crate::probability::{PriceRange, RegimeDiagnostics, SimulationResult};
use crate::regime::{ExpansionLimits, Regime, RegimeSelector};
use crate::resampler::MonteCarloResampler;
use crate::tail::TailStats;

/// Builds the simulated return vector for `horizon_hours` from `series`.
///
/// Regime attempts, in order, until one yields `min_samples` forward windows:
/// 1. the current bin and its neighbours, overlap step `h/4`;
/// 2. dynamic expansion towards `min_samples` momentum samples, step `h/4`;
/// 3. dynamic expansion towards `2 * min_samples`, step `h/6`.
///
/// # Errors
/// [`EngineError::ShortHistory`] when fewer than
/// `config.min_momentum_samples` momentum samples exist, and
/// [`EngineError::InsufficientRegimeData`] when every attempt falls short.
pub fn simulate_regime(
    series: &PriceSeries,
    horizon_hours: u32,
    config: &EngineConfig,
) -> Result<SimulationResult, EngineError> {
    let profile = HorizonProfile::for_horizon(horizon_hours);
    let momentum_window = profile.effective_momentum_window(horizon_hours);

    let momentum = MomentumSeries::extract(series, momentum_window);
    let short_history = || EngineError::ShortHistory {
        samples: momentum.len(),
        required: config.min_momentum_samples,
    };
    if momentum.len() < config.min_momentum_samples {
        return Err(short_history());
    }
    let current = *momentum.last().ok_or_else(short_history)?;
    let binning =
        MomentumBinning::from_values(&momentum.values(), profile.n_bins).ok_or_else(short_history)?;
    let current_bin = binning.identify_bin(current.momentum);

    let limits = ExpansionLimits {
        max_bins: config.max_expansion_bins,
        coverage: config.expansion_coverage,
    };
    let selector = RegimeSelector::new(&momentum, &binning, current_bin, limits);
    let extractor = ForwardReturnExtractor::new(series, horizon_hours as usize);
    let required = profile.min_samples;

    let first = if profile.include_neighbors {
        selector.neighbors()
    } else {
        Regime::single(current_bin)
    };
    let attempts = [
        (first, HorizonProfile::overlap_step(horizon_hours)),
        (
            selector.expand(required),
            HorizonProfile::overlap_step(horizon_hours),
        ),
        (
            selector.expand(required * 2),
            HorizonProfile::fine_overlap_step(horizon_hours),
        ),
    ];

    let mut found = 0;
    let mut selected = None;
    for (attempt, (regime, step)) in attempts.into_iter().enumerate() {
        let windows = extractor.overlapping(
            &momentum,
            selector.sample_bins(),
            &regime,
            step,
            config.max_overlap_windows,
        );
        tracing::debug!(
            attempt = attempt + 1,
            bins = ?regime.bins(),
            step,
            windows = windows.len(),
            required,
            "regime attempt"
        );
        found = windows.len();
        if found >= required {
            selected = Some((regime, window_values(&windows)));
            break;
        }
    }

    let Some((regime, pool)) = selected else {
        return Err(EngineError::InsufficientRegimeData {
            samples: found,
            required,
        });
    };

    let tail_sample = window_values(&extractor.non_overlapping(
        &momentum,
        selector.sample_bins(),
        &regime,
    ));
    let tail = TailStats::from_returns(&tail_sample);

    let resampler = MonteCarloResampler::new(profile.n_sim, config.seed);
    let (returns, mode) = resampler.resample(&pool, tail.adjustment())?;

    let current_price = series.last_close().unwrap_or(current.close);

    tracing::debug!(
        horizon_hours,
        profile = profile.class.label(),
        current_bin,
        pool = pool.len(),
        tail_sample = tail_sample.len(),
        alpha = tail.alpha,
        max_to_sum = tail.max_to_sum,
        "regime simulation complete"
    );

    Ok(SimulationResult {
        current_price,
        returns,
        diagnostics: RegimeDiagnostics {
            profile,
            momentum_window,
            current_momentum: current.momentum,
            current_bin,
            regime_bins: regime.bins(),
            pool_size: pool.len(),
            tail_sample_size: tail_sample.len(),
            tail,
            mode,
        },
    })
}

/// Cached probability engine over a history provider.
///
/// Histories are cached per symbol and simulations per (symbol, horizon)
/// for the lifetime of the engine; concurrent requests for one key share a
/// single computation.
pub struct RegimeEngine {
    provider: Arc<dyn PriceHistoryProvider>,
    config: EngineConfig,
    histories: HistoryCache,
    simulations: SimulationCache,
}

impl RegimeEngine {
    #[must_use]
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            config,
            histories: HistoryCache::new(),
            simulations: SimulationCache::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Price history for `symbol`, fetched on first use.
    ///
    /// # Errors
    /// [`EngineError::NoHistory`] when the provider fails.
    pub async fn history(&self, symbol: &str) -> Result<Arc<PriceSeries>, EngineError> {
        let key = symbol.to_ascii_uppercase();
        self.histories
            .get_or_try_init(&key, || async {
                let series = self.provider.fetch(&key).await?;
                tracing::info!(
                    symbol = %key,
                    provider = self.provider.name(),
                    observations = series.len(),
                    "price history loaded"
                );
                Ok::<_, EngineError>(series)
            })
            .await
    }

    /// Simulation for `(symbol, horizon_hours)`, computed on first use.
    ///
    /// # Errors
    /// Any [`EngineError`] from fetching history or simulating.
    pub async fn simulation(
        &self,
        symbol: &str,
        horizon_hours: u32,
    ) -> Result<Arc<SimulationResult>, EngineError> {
        let key = SimulationKey::new(symbol, horizon_hours);
        self.simulations
            .get_or_try_init(&key, || async {
                let series = self.history(&key.symbol).await?;
                let result = simulate_regime(&series, horizon_hours, &self.config)?;
                tracing::info!(
                    symbol = %key.symbol,
                    horizon_hours,
                    pool = result.diagnostics.pool_size,
                    regime_bins = result.diagnostics.regime_bins.len(),
                    "simulation cached"
                );
                Ok::<_, EngineError>(result)
            })
            .await
    }

    async fn available(&self, symbol: &str, horizon_hours: u32) -> Option<Arc<SimulationResult>> {
        match self.simulation(symbol, horizon_hours).await {
            Ok(result) => Some(result),
            Err(err) => {
                tracing::warn!(
                    symbol,
                    horizon_hours,
                    error = %err,
                    "probability unavailable"
                );
                None
            }
        }
    }

    /// Percentage of simulated final prices at or above `strike`.
    pub async fn probability_above(
        &self,
        symbol: &str,
        horizon_hours: u32,
        strike: f64,
    ) -> Option<f64> {
        let sim = self.available(symbol, horizon_hours).await?;
        Some(sim.probability_above(strike) * 100.0)
    }

    /// Percentage of simulated final prices inside `[low, high)`, with the
    /// open-ended conventions of [`PriceRange::from_bounds`].
    pub async fn probability_range(
        &self,
        symbol: &str,
        horizon_hours: u32,
        low: f64,
        high: f64,
    ) -> Option<f64> {
        self.probability_in(symbol, horizon_hours, PriceRange::from_bounds(low, high))
            .await
    }

    /// Percentage of simulated final prices inside `range`.
    pub async fn probability_in(
        &self,
        symbol: &str,
        horizon_hours: u32,
        range: PriceRange,
    ) -> Option<f64> {
        let sim = self.available(symbol, horizon_hours).await?;
        Some(sim.probability_in(range) * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use regime_odds_core::PriceObservation;

    fn random_walk(len: usize, seed: u64) -> PriceSeries {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut price = 40_000.0;
        (0..len)
            .map(|i| {
                let step: f64 = rng.gen_range(-0.01..0.01);
                price *= 1.0 + step;
                PriceObservation::new(start + Duration::hours(i as i64), price)
            })
            .collect()
    }

    #[test]
    fn simulation_has_n_sim_finite_returns() {
        let series = random_walk(3_000, 1);
        let sim = simulate_regime(&series, 4, &EngineConfig::default()).unwrap();
        assert_eq!(sim.returns.len(), 50_000);
        assert!(sim.returns.iter().all(|r| r.is_finite()));
        assert_eq!(sim.current_price, series.last_close().unwrap());
        assert!(sim.diagnostics.pool_size >= 20);
        assert!(sim.diagnostics.regime_bins.contains(&sim.diagnostics.current_bin));
    }

    #[test]
    fn momentum_window_grows_with_horizon() {
        let series = random_walk(5_000, 2);
        let sim = simulate_regime(&series, 48, &EngineConfig::default()).unwrap();
        assert_eq!(sim.diagnostics.momentum_window, 144);
        assert_eq!(sim.returns.len(), 100_000);
    }

    #[test]
    fn identical_inputs_are_reproducible() {
        let series = random_walk(2_000, 3);
        let config = EngineConfig::default();
        let a = simulate_regime(&series, 8, &config).unwrap();
        let b = simulate_regime(&series, 8, &config).unwrap();
        assert_eq!(a.returns, b.returns);
    }

    #[test]
    fn short_history_is_rejected() {
        let series = random_walk(120, 4);
        let err = simulate_regime(&series, 24, &EngineConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::ShortHistory {
                samples: 24,
                required: 100
            }
        ));
    }

    #[test]
    fn thin_regime_is_insufficient() {
        let series = random_walk(400, 5);
        let config = EngineConfig {
            min_momentum_samples: 10,
            ..EngineConfig::default()
        };
        // A 288h momentum window leaves only a handful of forward windows.
        let err = simulate_regime(&series, 96, &config).unwrap_err();
        assert!(err.is_insufficient_data());
    }
}
