//! Per-horizon simulation profiles.
//!
//! Short horizons use a coarser momentum partition and fewer draws; longer
//! horizons need a finer partition and more samples before the regime is
//! trusted.

use serde::{Deserialize, Serialize};

/// Horizon bucket a profile was selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HorizonClass {
    /// Up to 6 hours.
    UltraShort,
    /// Up to 12 hours.
    Short,
    /// Anything longer.
    MediumLong,
}

impl HorizonClass {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UltraShort => "ultra-short",
            Self::Short => "short",
            Self::MediumLong => "medium-long",
        }
    }
}

/// Simulation parameters for one horizon bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizonProfile {
    pub class: HorizonClass,
    /// Minimum trailing momentum window, in hourly observations.
    pub momentum_window: usize,
    /// Number of equal-width momentum bins.
    pub n_bins: usize,
    /// Whether the first regime attempt includes the adjacent bins.
    pub include_neighbors: bool,
    /// Length of the simulated return vector.
    pub n_sim: usize,
    /// Forward-return windows required before simulating.
    pub min_samples: usize,
    /// Reserved for time-decay weighting of regime samples; not applied.
    pub half_life_days: u32,
}

impl HorizonProfile {
    /// Selects the profile for a horizon expressed in hours.
    #[must_use]
    pub const fn for_horizon(horizon_hours: u32) -> Self {
        if horizon_hours <= 6 {
            Self {
                class: HorizonClass::UltraShort,
                momentum_window: 24,
                n_bins: 15,
                include_neighbors: true,
                n_sim: 50_000,
                min_samples: 20,
                half_life_days: 7,
            }
        } else if horizon_hours <= 12 {
            Self {
                class: HorizonClass::Short,
                momentum_window: 48,
                n_bins: 21,
                include_neighbors: true,
                n_sim: 50_000,
                min_samples: 25,
                half_life_days: 7,
            }
        } else {
            Self {
                class: HorizonClass::MediumLong,
                momentum_window: 96,
                n_bins: 47,
                include_neighbors: true,
                n_sim: 100_000,
                min_samples: 50,
                half_life_days: 30,
            }
        }
    }

    /// Trailing window actually used: never shorter than three horizons.
    #[must_use]
    pub fn effective_momentum_window(&self, horizon_hours: u32) -> usize {
        self.momentum_window.max(3 * horizon_hours as usize)
    }

    /// Overlap step for the regular forward-return pool.
    #[must_use]
    pub fn overlap_step(horizon_hours: u32) -> usize {
        (horizon_hours as usize / 4).max(1)
    }

    /// Finer overlap step for the last expansion attempt.
    #[must_use]
    pub fn fine_overlap_step(horizon_hours: u32) -> usize {
        (horizon_hours as usize / 6).max(1)
    }
}
