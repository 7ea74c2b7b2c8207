//! Regime-conditioned Monte Carlo probabilities for binary price contracts.
//!
//! Pipeline, per (symbol, horizon):
//! - trailing momentum over hourly closes, partitioned into equal-width bins;
//! - a regime of bins around the current momentum, widened until enough
//!   historical forward-return windows exist;
//! - tail statistics on non-overlapping windows deciding between a uniform
//!   bootstrap and a tail-weighted mixture;
//! - a seeded resample of `n_sim` horizon returns, evaluated against strikes
//!   and ranges.
//!
//! The [`edge`] module scores candidate trades against those probabilities.
//!
//! # Example
//!
//! ```no_run
//! use regime_odds_core::{EngineConfig, PriceHistoryProvider};
//! use regime_odds_engine::RegimeEngine;
//! use std::sync::Arc;
//!
//! async fn run(provider: Arc<dyn PriceHistoryProvider>) {
//!     let engine = RegimeEngine::new(provider, EngineConfig::default());
//!     if let Some(pct) = engine.probability_above("BTC", 24, 100_000.0).await {
//!         println!("P(BTC >= 100k in 24h) = {pct:.1}%");
//!     }
//! }
//! ```

pub mod binning;
pub mod cache;
pub mod edge;
pub mod engine;
pub mod error;
pub mod forward;
pub mod horizon;
pub mod momentum;
pub mod probability;
pub mod regime;
pub mod resampler;
pub mod tail;

pub use binning::MomentumBinning;
pub use cache::{HistoryCache, KeyedCache, SimulationCache, SimulationKey};
pub use edge::{
    compare_operations, evaluate_operation, normalize_probability, operations_for_contract,
    qualify, rank_operations, Operation, OperationMetrics, Rejection, Side, Verdict,
};
pub use engine::{simulate_regime, RegimeEngine};
pub use error::EngineError;
pub use forward::{ForwardReturnExtractor, ForwardWindow};
pub use horizon::{HorizonClass, HorizonProfile};
pub use momentum::{MomentumSample, MomentumSeries};
pub use probability::{PriceRange, RegimeDiagnostics, SimulationResult, OPEN_ENDED_HIGH};
pub use regime::{ExpansionLimits, Regime, RegimeSelector};
pub use resampler::{MixtureWeights, MonteCarloResampler, ResampleMode, TailPartition};
pub use tail::{TailAdjustment, TailStats};
