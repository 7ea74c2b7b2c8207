//! Equal-width momentum bins.

use serde::{Deserialize, Serialize};

/// `n_bins + 1` non-decreasing edges spanning the observed momentum range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumBinning {
    edges: Vec<f64>,
}

impl MomentumBinning {
    /// Builds equal-width bins over `[min, max]` of `values`.
    ///
    /// Returns `None` for an empty input, zero bins, or non-finite bounds.
    #[must_use]
    pub fn from_values(values: &[f64], n_bins: usize) -> Option<Self> {
        if n_bins == 0 {
            return None;
        }

        let (min, max) = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let width = (max - min) / n_bins as f64;
        let mut edges: Vec<f64> = (0..=n_bins).map(|i| min + width * i as f64).collect();
        // Pin the top edge so rounding never leaves `max` outside the span.
        edges[n_bins] = max;

        Some(Self { edges })
    }

    #[must_use]
    pub fn n_bins(&self) -> usize {
        self.edges.len() - 1
    }

    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Index of the bin `[edge_i, edge_{i+1})` containing `value`.
    ///
    /// Values at or above `edges[n_bins - 1]` that fall in no half-open
    /// interval clamp to the last bin; anything else unmatched (below the
    /// range, NaN) maps to bin 0.
    #[must_use]
    pub fn identify_bin(&self, value: f64) -> usize {
        let n_bins = self.n_bins();
        // Number of edges <= value; the containing interval starts just before it.
        let count = self.edges.partition_point(|&e| e <= value);
        if (1..=n_bins).contains(&count) {
            return count - 1;
        }
        if value >= self.edges[n_bins - 1] {
            return n_bins - 1;
        }
        0
    }
}
