//! Chronologically ordered price history.
//!
//! Every consumer of history (momentum, forward returns) indexes the series
//! positionally, so ordering and uniqueness of timestamps are enforced here
//! at construction rather than assumed from insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single close price at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    pub timestamp: DateTime<Utc>,
    pub close: f64,
}

impl PriceObservation {
    #[must_use]
    pub const fn new(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self { timestamp, close }
    }
}

/// Price observations strictly ordered by timestamp with no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    observations: Vec<PriceObservation>,
}

impl PriceSeries {
    /// Builds a series from observations in any order.
    ///
    /// Sorts by timestamp and keeps the last value seen for a duplicated
    /// timestamp (sorting is stable, so "last" means last in the input).
    #[must_use]
    pub fn from_observations(mut observations: Vec<PriceObservation>) -> Self {
        observations.sort_by_key(|o| o.timestamp);

        let mut deduped: Vec<PriceObservation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.timestamp == obs.timestamp => *last = obs,
                _ => deduped.push(obs),
            }
        }

        Self {
            observations: deduped,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    #[must_use]
    pub fn observations(&self) -> &[PriceObservation] {
        &self.observations
    }

    /// Close prices in chronological order.
    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.observations.iter().map(|o| o.close)
    }

    /// Most recent close, if any.
    #[must_use]
    pub fn last_close(&self) -> Option<f64> {
        self.observations.last().map(|o| o.close)
    }

    /// Single-step simple returns aligned to observation index.
    ///
    /// `returns()[i]` is the return from observation `i - 1` to `i`; index 0
    /// has no predecessor and is reported as 0.0 so positions line up with
    /// the observation vector.
    #[must_use]
    pub fn returns(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.observations.len());
        for (i, obs) in self.observations.iter().enumerate() {
            if i == 0 {
                out.push(0.0);
            } else {
                let prev = self.observations[i - 1].close;
                out.push(if prev == 0.0 { 0.0 } else { obs.close / prev - 1.0 });
            }
        }
        out
    }
}

impl FromIterator<PriceObservation> for PriceSeries {
    fn from_iter<I: IntoIterator<Item = PriceObservation>>(iter: I) -> Self {
        Self::from_observations(iter.into_iter().collect())
    }
}
