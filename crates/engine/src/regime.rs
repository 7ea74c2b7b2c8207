//! Adaptive selection of the historical momentum regime.
//!
//! The regime is the set of bins whose historical periods are treated as
//! analogs of the present. Selection starts from the current bin and its
//! neighbours; when that population is too thin the window grows outward
//! symmetrically until it holds enough samples.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::binning::MomentumBinning;
use crate::momentum::MomentumSeries;

/// A set of bin indices considered "current".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Regime {
    bins: BTreeSet<usize>,
}

impl Regime {
    #[must_use]
    pub fn single(bin: usize) -> Self {
        Self {
            bins: BTreeSet::from([bin]),
        }
    }

    #[must_use]
    pub fn contains(&self, bin: usize) -> bool {
        self.bins.contains(&bin)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Bins in ascending order.
    #[must_use]
    pub fn bins(&self) -> Vec<usize> {
        self.bins.iter().copied().collect()
    }

    fn insert(&mut self, bin: usize) {
        self.bins.insert(bin);
    }
}

impl FromIterator<usize> for Regime {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            bins: iter.into_iter().collect(),
        }
    }
}

/// Limits on dynamic expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionLimits {
    /// Stop once this many bins are selected.
    pub max_bins: usize,
    /// Stop once the selection covers this fraction of all bins.
    pub coverage: f64,
}

impl Default for ExpansionLimits {
    fn default() -> Self {
        Self {
            max_bins: 10,
            coverage: 0.30,
        }
    }
}

/// Chooses regimes around the current bin of a momentum history.
pub struct RegimeSelector {
    /// Bin index of every momentum sample, in sample order.
    sample_bins: Vec<usize>,
    n_bins: usize,
    current_bin: usize,
    limits: ExpansionLimits,
}

impl RegimeSelector {
    /// Classifies every sample once; `current_bin` is the bin of the latest sample.
    #[must_use]
    pub fn new(
        momentum: &MomentumSeries,
        binning: &MomentumBinning,
        current_bin: usize,
        limits: ExpansionLimits,
    ) -> Self {
        let sample_bins = momentum
            .samples()
            .iter()
            .map(|s| binning.identify_bin(s.momentum))
            .collect();

        Self {
            sample_bins,
            n_bins: binning.n_bins(),
            current_bin,
            limits,
        }
    }

    #[must_use]
    pub const fn current_bin(&self) -> usize {
        self.current_bin
    }

    /// Bin index of each momentum sample.
    #[must_use]
    pub fn sample_bins(&self) -> &[usize] {
        &self.sample_bins
    }

    /// Number of momentum samples falling in `regime`.
    #[must_use]
    pub fn count(&self, regime: &Regime) -> usize {
        self.sample_bins.iter().filter(|&&b| regime.contains(b)).count()
    }

    /// The current bin plus its immediate neighbours, clamped to the valid range.
    #[must_use]
    pub fn neighbors(&self) -> Regime {
        let mut regime = Regime::single(self.current_bin);
        if self.current_bin > 0 {
            regime.insert(self.current_bin - 1);
        }
        if self.current_bin + 1 < self.n_bins {
            regime.insert(self.current_bin + 1);
        }
        regime
    }

    /// Grows a symmetric window around the current bin until it holds
    /// `target` momentum samples.
    ///
    /// Expansion also stops when the window covers the configured fraction
    /// of all bins, when `max_bins` bins are selected, or when the distance
    /// reaches the number of bins.
    #[must_use]
    pub fn expand(&self, target: usize) -> Regime {
        let mut regime = Regime::single(self.current_bin);
        let mut distance = 1;

        while regime.len() < self.limits.max_bins && distance < self.n_bins {
            if let Some(low) = self.current_bin.checked_sub(distance) {
                regime.insert(low);
            }
            if self.current_bin + distance < self.n_bins {
                regime.insert(self.current_bin + distance);
            }

            let count = self.count(&regime);
            tracing::trace!(distance, bins = regime.len(), count, "expanded regime");
            if count >= target {
                break;
            }

            distance += 1;
            if regime.len() as f64 >= self.n_bins as f64 * self.limits.coverage {
                break;
            }
        }

        regime
    }
}
