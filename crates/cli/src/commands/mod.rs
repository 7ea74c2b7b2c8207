//! CLI commands for regime-conditioned odds.

pub mod evaluate;
pub mod probability;
pub mod scan;

pub use evaluate::{run_evaluate, EvaluateArgs};
pub use probability::{run_probability, ProbabilityArgs};
pub use scan::{run_scan, ScanArgs};

use anyhow::Result;
use regime_odds_core::{AppConfig, ConfigLoader};
use regime_odds_data::FallbackHistory;
use regime_odds_engine::RegimeEngine;
use std::path::Path;
use std::sync::Arc;

/// Layered configuration, from `path` when given.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::debug!("Loading configuration from {}", path.display());
            ConfigLoader::load_from(path)
        }
        None => ConfigLoader::load(),
    }
}

/// Engine backed by the configured provider chain.
pub(crate) fn build_engine(config: &AppConfig) -> RegimeEngine {
    let history = FallbackHistory::from_config(&config.history, &config.coins);
    RegimeEngine::new(Arc::new(history), config.engine.clone())
}
