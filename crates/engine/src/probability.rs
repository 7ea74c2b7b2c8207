//! Probability evaluation over a simulated return vector.

use serde::{Deserialize, Serialize};

use crate::horizon::HorizonProfile;
use crate::resampler::ResampleMode;
use crate::tail::TailStats;

/// Upper bound at or above which a range is treated as open-ended.
pub const OPEN_ENDED_HIGH: f64 = 999_999.0;

/// Price interval of a range contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PriceRange {
    /// Final price strictly below the bound.
    Below(f64),
    /// `low <= final price < high`.
    Between(f64, f64),
    /// Final price strictly above the bound.
    Above(f64),
}

impl PriceRange {
    /// Interprets raw `(low, high)` bounds: an open-ended `high` means
    /// "above low", a zero `low` means "below high".
    #[must_use]
    pub fn from_bounds(low: f64, high: f64) -> Self {
        if high >= OPEN_ENDED_HIGH || high.is_infinite() {
            Self::Above(low)
        } else if low == 0.0 {
            Self::Below(high)
        } else {
            Self::Between(low, high)
        }
    }

    /// Raw `(low, high)` bounds, using [`OPEN_ENDED_HIGH`] above and zero below.
    #[must_use]
    pub fn bounds(&self) -> (f64, f64) {
        match *self {
            Self::Below(high) => (0.0, high),
            Self::Between(low, high) => (low, high),
            Self::Above(low) => (low, OPEN_ENDED_HIGH),
        }
    }

    /// Lower bound used to order ranges, zero for `Below`.
    #[must_use]
    pub fn sort_key(&self) -> f64 {
        self.bounds().0
    }

    #[must_use]
    pub fn contains(&self, price: f64) -> bool {
        match *self {
            Self::Below(high) => price < high,
            Self::Between(low, high) => low <= price && price < high,
            Self::Above(low) => price > low,
        }
    }
}

/// How the simulated vector for a (symbol, horizon) was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeDiagnostics {
    pub profile: HorizonProfile,
    pub momentum_window: usize,
    pub current_momentum: f64,
    pub current_bin: usize,
    pub regime_bins: Vec<usize>,
    /// Overlapping forward windows in the bootstrap pool.
    pub pool_size: usize,
    /// Non-overlapping windows used for tail statistics.
    pub tail_sample_size: usize,
    pub tail: TailStats,
    pub mode: ResampleMode,
}

/// Current price and `n_sim` finite simulated horizon returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub current_price: f64,
    pub returns: Vec<f64>,
    pub diagnostics: RegimeDiagnostics,
}

impl SimulationResult {
    /// Simulated prices at resolution.
    pub fn final_prices(&self) -> impl Iterator<Item = f64> + '_ {
        self.returns.iter().map(move |r| self.current_price * (1.0 + r))
    }

    fn fraction_where(&self, predicate: impl Fn(f64) -> bool) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        let hits = self.final_prices().filter(|&p| predicate(p)).count();
        hits as f64 / self.returns.len() as f64
    }

    /// Fraction of simulated final prices at or above `strike`.
    #[must_use]
    pub fn probability_above(&self, strike: f64) -> f64 {
        self.fraction_where(|p| p >= strike)
    }

    /// Fraction of simulated final prices inside `range`.
    #[must_use]
    pub fn probability_in(&self, range: PriceRange) -> f64 {
        self.fraction_where(|p| range.contains(p))
    }

    /// Fraction inside raw `(low, high)` bounds; see [`PriceRange::from_bounds`].
    #[must_use]
    pub fn probability_range(&self, low: f64, high: f64) -> f64 {
        self.probability_in(PriceRange::from_bounds(low, high))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn result_with(current_price: f64, returns: Vec<f64>) -> SimulationResult {
        SimulationResult {
            current_price,
            diagnostics: RegimeDiagnostics {
                profile: HorizonProfile::for_horizon(24),
                momentum_window: 96,
                current_momentum: 0.0,
                current_bin: 0,
                regime_bins: vec![0],
                pool_size: returns.len(),
                tail_sample_size: 0,
                tail: TailStats::undefined(),
                mode: ResampleMode::Uniform,
            },
            returns,
        }
    }

    #[test]
    fn above_counts_at_or_above_strike() {
        let sim = result_with(100.0, vec![-0.10, 0.0, 0.05, 0.10]);
        assert_eq!(sim.probability_above(100.0), 0.75);
        assert_eq!(sim.probability_above(104.0), 0.5);
        assert_eq!(sim.probability_above(200.0), 0.0);
        assert_eq!(sim.probability_above(0.0), 1.0);
    }

    #[test]
    fn above_is_non_increasing_in_strike() {
        let returns: Vec<f64> = (0..500)
            .map(|i| ((i * 7919) % 401) as f64 / 1000.0 - 0.2)
            .collect();
        let sim = result_with(50_000.0, returns);
        let mut prev = 1.0;
        for strike in (30_000..70_000).step_by(250) {
            let p = sim.probability_above(f64::from(strike));
            assert!(p <= prev);
            prev = p;
        }
    }

    #[test]
    fn range_bounds_interpretation() {
        assert_eq!(PriceRange::from_bounds(0.0, 100.0), PriceRange::Below(100.0));
        assert_eq!(PriceRange::from_bounds(100.0, 999_999.0), PriceRange::Above(100.0));
        assert_eq!(PriceRange::from_bounds(100.0, f64::INFINITY), PriceRange::Above(100.0));
        assert_eq!(PriceRange::from_bounds(90.0, 110.0), PriceRange::Between(90.0, 110.0));
        for range in [
            PriceRange::Below(100.0),
            PriceRange::Between(90.0, 110.0),
            PriceRange::Above(100.0),
        ] {
            let (low, high) = range.bounds();
            assert_eq!(PriceRange::from_bounds(low, high), range);
        }
    }

    #[test]
    fn range_probabilities() {
        let sim = result_with(100.0, vec![-0.20, -0.05, 0.0, 0.05, 0.20]);
        // Final prices: 80, 95, 100, 105, 120.
        assert_eq!(sim.probability_range(94.0, 104.0), 0.4);
        assert_eq!(sim.probability_range(0.0, 100.0), 0.4);
        assert_eq!(sim.probability_range(100.0, OPEN_ENDED_HIGH), 0.4);
    }

    #[test]
    fn partition_of_ranges_sums_to_one() {
        let sim = result_with(100.0, vec![-0.20, -0.05, 0.0, 0.05, 0.20, 0.33]);
        let total = sim.probability_range(0.0, 90.0)
            + sim.probability_range(90.0, 110.0)
            + sim.probability_range(110.0, OPEN_ENDED_HIGH);
        assert!((total - 1.0).abs() < 1e-12);
    }
}
