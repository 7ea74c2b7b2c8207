//! Scan command: price every open Polymarket crypto contract with the regime
//! engine and report the resulting operations per coin and overall.

use anyhow::{bail, Result};
use chrono::Utc;
use clap::Args;
use regime_odds_core::{CoinConfig, QualificationConfig};
use regime_odds_engine::{operations_for_contract, RegimeEngine};
use regime_odds_polymarket::{Contract, EventSnapshot, MarketScanner};
use std::path::PathBuf;

use super::{build_engine, load_config};
use crate::report::{write_event_table, write_operations, MarketRow, OperationRow};

/// Arguments for the scan command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Coins to scan (e.g., "BTC,ETH"). Defaults to every configured coin.
    #[arg(long, value_delimiter = ',')]
    pub coins: Vec<String>,

    /// Config file path
    #[arg(short, long, env = "REGIME_ODDS_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Configured coins matching `requested`, all of them when empty.
///
/// # Errors
/// Returns an error naming any requested symbol that is not configured.
pub(crate) fn select_coins<'a>(
    configured: &'a [CoinConfig],
    requested: &[String],
) -> Result<Vec<&'a CoinConfig>> {
    if requested.is_empty() {
        return Ok(configured.iter().collect());
    }
    let mut selected = Vec::with_capacity(requested.len());
    for symbol in requested {
        let Some(coin) = configured
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(symbol.trim()))
        else {
            bail!("coin {symbol} is not configured");
        };
        selected.push(coin);
    }
    Ok(selected)
}

/// Runs the scan command.
///
/// # Errors
/// Returns an error on unknown coins, unreadable configuration or a failed
/// write to stdout. Venue and history failures are logged and skipped.
pub async fn run_scan(args: ScanArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let coins = select_coins(&config.coins.0, &args.coins)?;
    let engine = build_engine(&config);
    let scanner = MarketScanner::new(&config.venue);

    tracing::info!("Preloading price history for {} coin(s)", coins.len());
    for coin in &coins {
        if let Err(err) = engine.history(&coin.symbol).await {
            tracing::warn!(symbol = %coin.symbol, error = %err, "history unavailable");
        }
    }

    let now = Utc::now();
    let mut operations = Vec::new();
    let mut out = std::io::stdout();

    for coin in coins {
        let snapshot = scanner.snapshot(coin, now).await;
        if snapshot.is_empty() {
            tracing::warn!(symbol = %coin.symbol, "no open events");
            continue;
        }

        for (kind, event) in snapshot.events() {
            let rows = price_event(
                &engine,
                &snapshot.symbol,
                event,
                &config.qualification,
                &mut operations,
            )
            .await;
            write_event_table(&mut out, &snapshot.symbol, kind, event, &rows)?;
        }
    }

    // Rows stay in scan order; the report groups and ranks them.
    write_operations(&mut out, &operations)?;
    Ok(())
}

/// Model probabilities for every contract of `event`; the candidate
/// operations are appended to `operations`.
async fn price_event(
    engine: &RegimeEngine,
    symbol: &str,
    event: &EventSnapshot,
    rules: &QualificationConfig,
    operations: &mut Vec<OperationRow>,
) -> Vec<MarketRow> {
    let horizon = event.resolution.hours_rounded;
    let mut rows = Vec::with_capacity(event.contracts.len());

    for contract in &event.contracts {
        let model = match contract.contract {
            Contract::Above { strike } => engine.probability_above(symbol, horizon, strike).await,
            Contract::Range(range) => engine.probability_in(symbol, horizon, range).await,
        };
        let label = contract.contract.label();

        let (yes_bid, no_bid) = contract
            .quote
            .map_or((None, None), |q| (q.yes_bid(), q.no_bid()));
        let candidates = operations_for_contract(model, yes_bid, no_bid, rules);
        operations.extend(candidates.into_iter().map(|operation| OperationRow {
            coin: symbol.to_string(),
            contract: label.clone(),
            operation,
        }));

        rows.push(MarketRow {
            label,
            model,
            quote: contract.quote,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use regime_odds_core::CoinList;

    #[test]
    fn coin_selection() {
        let coins = CoinList::default();
        let all = select_coins(&coins.0, &[]).unwrap();
        assert_eq!(all.len(), 4);

        let picked = select_coins(&coins.0, &["eth".to_string(), " XRP".to_string()]).unwrap();
        let symbols: Vec<&str> = picked.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["ETH", "XRP"]);

        assert!(select_coins(&coins.0, &["DOGE".to_string()]).is_err());
    }
}
