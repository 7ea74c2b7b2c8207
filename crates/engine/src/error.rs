//! Errors produced while building a regime simulation.

use regime_odds_core::ProviderError;
use thiserror::Error;

/// Why no simulation is available for a (symbol, horizon).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Every history provider failed.
    #[error("no price history: {0}")]
    NoHistory(#[from] ProviderError),

    /// History too short to derive enough momentum samples.
    #[error("history too short: {samples} momentum samples, {required} required")]
    ShortHistory {
        /// Momentum samples derived.
        samples: usize,
        /// Momentum samples required.
        required: usize,
    },

    /// Regime too thin after every expansion attempt.
    #[error("insufficient regime data: {samples} forward windows, {required} required")]
    InsufficientRegimeData {
        /// Forward-return windows found.
        samples: usize,
        /// Windows required by the horizon profile.
        required: usize,
    },

    /// Resampling was asked to draw from an empty pool.
    #[error("empty resampling pool")]
    EmptyPool,
}

impl EngineError {
    /// True when the failure is a lack of data rather than a provider fault.
    #[must_use]
    pub const fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            Self::ShortHistory { .. } | Self::InsufficientRegimeData { .. } | Self::EmptyPool
        )
    }
}
