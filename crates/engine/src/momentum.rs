//! Trailing compounded-return momentum.

use chrono::{DateTime, Utc};
use regime_odds_core::PriceSeries;
use serde::{Deserialize, Serialize};

/// Momentum observed at one position of the price series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumSample {
    /// Index of the observation in the source series.
    pub position: usize,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// Compounded return over the trailing window ending at `position`.
    pub momentum: f64,
}

/// Momentum samples in chronological order (strictly increasing `position`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MomentumSeries {
    window: usize,
    samples: Vec<MomentumSample>,
}

impl MomentumSeries {
    /// Computes one sample per observation index `i >= window`.
    ///
    /// Momentum at `i` compounds the `window` single-step returns ending at
    /// `i`. A series no longer than `window` yields no samples.
    #[must_use]
    pub fn extract(series: &PriceSeries, window: usize) -> Self {
        let len = series.len();
        if len <= window {
            return Self {
                window,
                samples: Vec::new(),
            };
        }

        let returns = series.returns();
        let observations = series.observations();
        let samples = (window..len)
            .map(|i| {
                let momentum = returns[i + 1 - window..=i]
                    .iter()
                    .fold(1.0, |acc, r| acc * (1.0 + r))
                    - 1.0;
                MomentumSample {
                    position: i,
                    timestamp: observations[i].timestamp,
                    close: observations[i].close,
                    momentum,
                }
            })
            .collect();

        Self { window, samples }
    }

    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn samples(&self) -> &[MomentumSample] {
        &self.samples
    }

    #[must_use]
    pub fn last(&self) -> Option<&MomentumSample> {
        self.samples.last()
    }

    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.momentum).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use regime_odds_core::PriceObservation;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceObservation::new(start + Duration::hours(i as i64), c))
            .collect()
    }

    #[test]
    fn sample_count_is_length_minus_window() {
        let closes: Vec<f64> = (0..50).map(|i| 100.0 + f64::from(i)).collect();
        let s = series(&closes);
        for window in [1, 5, 24, 49] {
            assert_eq!(MomentumSeries::extract(&s, window).len(), 50 - window);
        }
    }

    #[test]
    fn short_series_yields_nothing() {
        let s = series(&[100.0, 101.0, 102.0]);
        assert!(MomentumSeries::extract(&s, 3).is_empty());
        assert!(MomentumSeries::extract(&s, 10).is_empty());
    }

    #[test]
    fn momentum_compounds_trailing_returns() {
        let s = series(&[100.0, 110.0, 121.0, 108.9]);
        let m = MomentumSeries::extract(&s, 2);
        assert_eq!(m.len(), 2);

        // 100 -> 121 over the two returns ending at index 2.
        assert_eq!(m.samples()[0].position, 2);
        assert!((m.samples()[0].momentum - 0.21).abs() < 1e-12);

        // 110 -> 108.9 over the two returns ending at index 3.
        assert!((m.samples()[1].momentum - (108.9 / 110.0 - 1.0)).abs() < 1e-12);
        assert_eq!(m.last().unwrap().close, 108.9);
    }

    #[test]
    fn positions_are_strictly_increasing() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + f64::from(i % 7)).collect();
        let m = MomentumSeries::extract(&series(&closes), 4);
        assert!(m.samples().windows(2).all(|w| w[0].position < w[1].position));
    }
}
