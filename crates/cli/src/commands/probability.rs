//! Probability command: one strike or range for one symbol and horizon.

use anyhow::{anyhow, bail, Result};
use clap::Args;
use regime_odds_engine::PriceRange;
use regime_odds_polymarket::{format_usd, range_label};
use std::io::Write;
use std::path::PathBuf;

use super::{build_engine, load_config};
use crate::report::write_diagnostics;

/// Arguments for the probability command.
#[derive(Args, Debug, Clone)]
pub struct ProbabilityArgs {
    /// Symbol (e.g., "BTC")
    #[arg(long)]
    pub symbol: String,

    /// Horizon in hours
    #[arg(long)]
    pub horizon: u32,

    /// Strike for P(price >= strike)
    #[arg(
        long,
        conflicts_with_all = ["low", "high"],
        required_unless_present_any = ["low", "high"]
    )]
    pub strike: Option<f64>,

    /// Lower bound of the range (0 for "below high")
    #[arg(long, requires = "high")]
    pub low: Option<f64>,

    /// Upper bound of the range (999999 or more for "above low")
    #[arg(long, requires = "low")]
    pub high: Option<f64>,

    /// Config file path
    #[arg(short, long, env = "REGIME_ODDS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// What the probability is asked for.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Target {
    Above(f64),
    Range(PriceRange),
}

impl ProbabilityArgs {
    fn target(&self) -> Result<Target> {
        match (self.strike, self.low, self.high) {
            (Some(strike), _, _) if strike > 0.0 => Ok(Target::Above(strike)),
            (Some(strike), _, _) => bail!("strike must be positive, got {strike}"),
            (None, Some(low), Some(high)) if low < high => {
                Ok(Target::Range(PriceRange::from_bounds(low, high)))
            }
            (None, Some(low), Some(high)) => bail!("empty range: low {low} >= high {high}"),
            _ => bail!("either --strike or both --low and --high are required"),
        }
    }
}

/// Runs the probability command.
///
/// # Errors
/// Returns an error on invalid arguments or when the engine cannot produce a
/// probability for the symbol and horizon.
pub async fn run_probability(args: ProbabilityArgs) -> Result<()> {
    if args.horizon == 0 {
        bail!("horizon must be at least 1 hour");
    }
    let target = args.target()?;
    let config = load_config(args.config.as_deref())?;
    let engine = build_engine(&config);
    let symbol = args.symbol.to_ascii_uppercase();

    let (description, pct) = match target {
        Target::Above(strike) => (
            format!("P({symbol} >= {}) in {}h", format_usd(strike), args.horizon),
            engine.probability_above(&symbol, args.horizon, strike).await,
        ),
        Target::Range(range) => (
            format!("P({symbol} in {}) in {}h", range_label(&range), args.horizon),
            engine.probability_in(&symbol, args.horizon, range).await,
        ),
    };
    let pct = pct.ok_or_else(|| {
        anyhow!(
            "probability unavailable for {symbol} at {}h, see log for details",
            args.horizon
        )
    })?;

    let mut out = std::io::stdout();
    writeln!(out, "{description} = {pct:.2}%")?;
    if let Ok(sim) = engine.simulation(&symbol, args.horizon).await {
        writeln!(out)?;
        write_diagnostics(&mut out, &sim, engine.config())?;
    }
    Ok(())
}
