//! Monte Carlo resampling of regime forward returns.
//!
//! Two modes:
//! - uniform bootstrap with replacement from the regime pool;
//! - a three-zone mixture that splits the pool at its 10th and 90th
//!   percentiles and draws each tail with boosted probability.
//!
//! The generator is seeded once per call, so one seed governs the whole
//! simulated vector and identical inputs give bit-identical outputs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::tail::TailAdjustment;

/// Pool size below which the mixture is never used.
pub const MIN_MIXTURE_POOL: usize = 30;

/// Base per-side tail probability before weighting.
pub const BASE_TAIL_PROBABILITY: f64 = 0.10;

/// Floor on the center-zone probability.
pub const MIN_CENTER_PROBABILITY: f64 = 0.10;

/// Draw probabilities of the three mixture zones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MixtureWeights {
    pub low_tail: f64,
    pub center: f64,
    pub high_tail: f64,
}

impl MixtureWeights {
    /// Per-side probability `0.1 * weight`, rebalanced so the center never
    /// drops below [`MIN_CENTER_PROBABILITY`].
    #[must_use]
    pub fn from_tail_weight(weight: f64) -> Self {
        let mut tail = BASE_TAIL_PROBABILITY * weight;
        let mut center = 1.0 - 2.0 * tail;
        if center < MIN_CENTER_PROBABILITY {
            center = MIN_CENTER_PROBABILITY;
            tail = (1.0 - center) / 2.0;
        }
        Self {
            low_tail: tail,
            center,
            high_tail: tail,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.low_tail + self.center + self.high_tail
    }
}

/// How the simulated vector was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResampleMode {
    Uniform,
    TailMixture(MixtureWeights),
}

impl ResampleMode {
    /// Mixture only when tails warrant it and the pool can support three zones.
    #[must_use]
    pub fn select(pool_len: usize, adjustment: TailAdjustment) -> Self {
        if !adjustment.adjust || pool_len < MIN_MIXTURE_POOL {
            Self::Uniform
        } else {
            Self::TailMixture(MixtureWeights::from_tail_weight(adjustment.weight))
        }
    }
}

/// Pool partitioned at its 10th / 90th percentiles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TailPartition {
    /// Strictly below the 10th percentile.
    pub low: Vec<f64>,
    /// Between the two thresholds, inclusive.
    pub center: Vec<f64>,
    /// Strictly above the 90th percentile.
    pub high: Vec<f64>,
}

impl TailPartition {
    #[must_use]
    pub fn split(pool: &[f64]) -> Self {
        let mut sorted = pool.to_vec();
        sorted.sort_by(f64::total_cmp);
        let low_threshold = percentile(&sorted, 10.0);
        let high_threshold = percentile(&sorted, 90.0);

        let mut partition = Self::default();
        for &value in pool {
            if value < low_threshold {
                partition.low.push(value);
            } else if value > high_threshold {
                partition.high.push(value);
            } else {
                partition.center.push(value);
            }
        }
        partition
    }
}

/// Draws synthetic horizon returns from a regime pool.
#[derive(Debug, Clone)]
pub struct MonteCarloResampler {
    n_sim: usize,
    seed: u64,
}

impl MonteCarloResampler {
    #[must_use]
    pub const fn new(n_sim: usize, seed: u64) -> Self {
        Self { n_sim, seed }
    }

    #[must_use]
    pub const fn n_sim(&self) -> usize {
        self.n_sim
    }

    /// Draws `n_sim` returns using the mode implied by `adjustment`.
    ///
    /// # Errors
    /// Returns [`EngineError::EmptyPool`] when there is nothing to draw from.
    pub fn resample(
        &self,
        pool: &[f64],
        adjustment: TailAdjustment,
    ) -> Result<(Vec<f64>, ResampleMode), EngineError> {
        if pool.is_empty() {
            return Err(EngineError::EmptyPool);
        }

        let mode = ResampleMode::select(pool.len(), adjustment);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let draws = match mode {
            ResampleMode::Uniform => self.uniform(pool, &mut rng),
            ResampleMode::TailMixture(weights) => self.mixture(pool, weights, &mut rng),
        };

        tracing::debug!(
            pool = pool.len(),
            n_sim = self.n_sim,
            mode = ?mode,
            "resampled regime returns"
        );

        Ok((draws, mode))
    }

    fn uniform(&self, pool: &[f64], rng: &mut ChaCha8Rng) -> Vec<f64> {
        (0..self.n_sim)
            .map(|_| pool[rng.gen_range(0..pool.len())])
            .collect()
    }

    fn mixture(&self, pool: &[f64], weights: MixtureWeights, rng: &mut ChaCha8Rng) -> Vec<f64> {
        let partition = TailPartition::split(pool);
        let high_cutoff = 1.0 - weights.high_tail;

        (0..self.n_sim)
            .map(|_| {
                let u: f64 = rng.gen();
                let zone: &[f64] = if u < weights.low_tail {
                    &partition.low
                } else if u > high_cutoff {
                    &partition.high
                } else {
                    &partition.center
                };
                let zone = if zone.is_empty() { pool } else { zone };
                zone[rng.gen_range(0..zone.len())]
            })
            .collect()
    }
}

/// Percentile of sorted data with linear interpolation between order statistics.
#[must_use]
pub fn percentile(sorted: &[f64], pct: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (pct / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let frac = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * frac
        }
    }
}
