//! Evaluate command: scores a single trade without touching the network.

use anyhow::{bail, Result};
use clap::Args;
use regime_odds_engine::{evaluate_operation, Side};
use std::path::PathBuf;

use super::load_config;
use crate::report::write_evaluation;

/// Arguments for the evaluate command.
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Model probability of YES, as a percentage (97) or a fraction (0.97)
    #[arg(long)]
    pub probability: f64,

    /// Bid of the outcome token being bought (0-1)
    #[arg(long)]
    pub bid: f64,

    /// Outcome to buy: yes or no
    #[arg(long, default_value = "yes")]
    pub side: Side,

    /// Config file path (qualification thresholds)
    #[arg(short, long, env = "REGIME_ODDS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Runs the evaluate command.
///
/// # Errors
/// Returns an error on out-of-range inputs or unreadable configuration.
pub fn run_evaluate(args: EvaluateArgs) -> Result<()> {
    if !(0.0..=100.0).contains(&args.probability) {
        bail!("probability must be within 0-100, got {}", args.probability);
    }
    if !(args.bid > 0.0 && args.bid < 1.0) {
        bail!("bid must be strictly between 0 and 1, got {}", args.bid);
    }

    let config = load_config(args.config.as_deref())?;
    let operation = evaluate_operation(
        args.probability,
        args.bid,
        args.side,
        &config.qualification,
    );
    write_evaluation(&mut std::io::stdout().lock(), &operation)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(probability: f64, bid: f64) -> EvaluateArgs {
        EvaluateArgs {
            probability,
            bid,
            side: Side::BuyYes,
            config: None,
        }
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        assert!(run_evaluate(args(120.0, 0.5)).is_err());
        assert!(run_evaluate(args(50.0, 0.0)).is_err());
        assert!(run_evaluate(args(50.0, 1.0)).is_err());
    }
}
