//! Tail-risk statistics on non-overlapping regime returns.
//!
//! Undefined statistics are carried as `NaN` and never trigger a tail
//! adjustment.

use serde::{Deserialize, Serialize};

/// Samples required before either statistic is computed.
pub const MIN_TAIL_SAMPLES: usize = 20;

/// Smallest number of order statistics used by the Hill estimator.
pub const MIN_HILL_ORDER: usize = 10;

/// Fraction of the sample treated as the tail by the Hill estimator.
pub const HILL_TAIL_FRACTION: f64 = 0.10;

/// Hill tail index and max-to-sum concentration of a return sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailStats {
    /// Hill tail index; smaller means heavier tails. `NaN` when undefined.
    pub alpha: f64,
    /// Largest absolute return over the sum of absolute returns. `NaN` when undefined.
    pub max_to_sum: f64,
}

impl TailStats {
    /// Both statistics undefined.
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            alpha: f64::NAN,
            max_to_sum: f64::NAN,
        }
    }

    /// Computes both statistics, or [`TailStats::undefined`] below
    /// [`MIN_TAIL_SAMPLES`] observations.
    #[must_use]
    pub fn from_returns(returns: &[f64]) -> Self {
        if returns.len() < MIN_TAIL_SAMPLES {
            return Self::undefined();
        }
        Self {
            alpha: hill_tail_index(returns),
            max_to_sum: max_to_sum(returns),
        }
    }

    /// Resampling adjustment implied by these statistics.
    #[must_use]
    pub fn adjustment(&self) -> TailAdjustment {
        let mut adjust = false;
        let mut weight: f64 = 1.0;

        if !self.alpha.is_nan() {
            if self.alpha < 2.0 {
                adjust = true;
                weight = 3.0;
            } else if self.alpha < 3.0 {
                adjust = true;
                weight = 2.0;
            }
        }

        if !self.max_to_sum.is_nan() && self.max_to_sum > 0.05 {
            adjust = true;
            weight = weight.max(1.5);
        }

        TailAdjustment { adjust, weight }
    }
}

/// Whether and how strongly the resampler over-weights the tails.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailAdjustment {
    pub adjust: bool,
    /// Multiplier on the base 10% per-side tail probability.
    pub weight: f64,
}

impl TailAdjustment {
    #[must_use]
    pub const fn none() -> Self {
        Self {
            adjust: false,
            weight: 1.0,
        }
    }
}

/// Hill estimator of the tail index on absolute returns.
///
/// Uses the `k = max(10, round(0.10 n))` largest absolute values scaled by the
/// next order statistic. Returns `NaN` below [`MIN_TAIL_SAMPLES`], when the
/// reference value is zero or missing, or when no log-ratio is informative.
#[must_use]
pub fn hill_tail_index(returns: &[f64]) -> f64 {
    let n = returns.len();
    if n < MIN_TAIL_SAMPLES {
        return f64::NAN;
    }

    let k = MIN_HILL_ORDER.max((n as f64 * HILL_TAIL_FRACTION).round() as usize);
    if k >= n {
        return f64::NAN;
    }

    let mut sorted: Vec<f64> = returns.iter().map(|r| r.abs()).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let reference = sorted[k];
    if reference.is_nan() || reference <= 0.0 {
        return f64::NAN;
    }

    let logs: Vec<f64> = sorted[..k]
        .iter()
        .map(|v| v / reference)
        .filter(|ratio| ratio.is_finite() && *ratio > 0.0)
        .map(f64::ln)
        .filter(|l| l.is_finite())
        .collect();
    if logs.is_empty() {
        return f64::NAN;
    }

    let mean = logs.iter().sum::<f64>() / logs.len() as f64;
    let alpha = 1.0 / mean;
    if alpha.is_finite() {
        alpha
    } else {
        f64::NAN
    }
}

/// Largest absolute return divided by the sum of absolute returns.
#[must_use]
pub fn max_to_sum(returns: &[f64]) -> f64 {
    let sum: f64 = returns.iter().map(|r| r.abs()).sum();
    if returns.is_empty() || sum == 0.0 {
        return f64::NAN;
    }
    let max = returns.iter().map(|r| r.abs()).fold(0.0, f64::max);
    max / sum
}
