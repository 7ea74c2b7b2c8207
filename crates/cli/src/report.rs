//! Plain-text tables written to stdout.

use regime_odds_core::EngineConfig;
use regime_odds_engine::{compare_operations, Operation, SimulationResult};
use regime_odds_polymarket::{ContractKind, EventSnapshot, MarketQuote};
use std::io::{self, Write};

const WIDTH: usize = 100;
const NOT_AVAILABLE: &str = "N/A";

/// Venue price, or `N/A` when missing or zero.
pub fn price_cell(price: Option<f64>) -> String {
    match price {
        Some(p) if p > 0.0 => format!("{p:.3}"),
        _ => NOT_AVAILABLE.to_string(),
    }
}

pub fn percent_cell(pct: Option<f64>) -> String {
    pct.map_or_else(|| NOT_AVAILABLE.to_string(), |p| format!("{p:.1}%"))
}

/// One contract line of an event table.
#[derive(Debug, Clone)]
pub struct MarketRow {
    pub label: String,
    /// Model probability of YES, in percent.
    pub model: Option<f64>,
    pub quote: Option<MarketQuote>,
}

/// A scored operation together with the contract it belongs to.
#[derive(Debug, Clone)]
pub struct OperationRow {
    pub coin: String,
    pub contract: String,
    pub operation: Operation,
}

pub fn write_event_table<W: Write>(
    out: &mut W,
    symbol: &str,
    kind: ContractKind,
    event: &EventSnapshot,
    rows: &[MarketRow],
) -> io::Result<()> {
    let first_column = match kind {
        ContractKind::Above => "STRIKE",
        ContractKind::Range => "RANGE",
    };

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(WIDTH))?;
    writeln!(out, "{symbol} | {}", event.title)?;
    writeln!(
        out,
        "Resolves in {} (horizon {}h) | {}",
        event.resolution.label, event.resolution.hours_rounded, event.url
    )?;
    writeln!(out, "{}", "=".repeat(WIDTH))?;
    writeln!(
        out,
        "{:<20} {:>8} {:>9} {:>9} {:>9} {:>9}",
        first_column, "CALC", "YES BID", "YES ASK", "NO BID", "NO ASK"
    )?;
    writeln!(out, "{}", "-".repeat(WIDTH))?;

    for row in rows {
        let quote = row.quote.unwrap_or_default();
        writeln!(
            out,
            "{:<20} {:>8} {:>9} {:>9} {:>9} {:>9}",
            row.label,
            percent_cell(row.model),
            price_cell(quote.yes.bid),
            price_cell(quote.yes.ask),
            price_cell(quote.no.bid),
            price_cell(quote.no.ask),
        )?;
    }
    Ok(())
}

fn write_operation_header<W: Write>(out: &mut W, with_coin: bool) -> io::Result<()> {
    if with_coin {
        write!(out, "{:<6} ", "COIN")?;
    }
    writeln!(
        out,
        "{:<16} {:<8} {:>7} {:>8}  {}",
        "STRIKE", "SIDE", "BID", "P.LOSS", "STATUS"
    )?;
    writeln!(out, "{}", "-".repeat(WIDTH))
}

fn write_operation_line<W: Write>(
    out: &mut W,
    row: &OperationRow,
    with_coin: bool,
) -> io::Result<()> {
    let op = &row.operation;
    if with_coin {
        write!(out, "{:<6} ", row.coin)?;
    }
    writeln!(
        out,
        "{:<16} {:<8} {:>6.1}c {:>7.1}%  {}",
        row.contract,
        op.side.label(),
        op.bid * 100.0,
        op.metrics.loss_prob * 100.0,
        op.verdict,
    )
}

fn qualified_count(rows: &[&OperationRow]) -> usize {
    rows.iter().filter(|r| r.operation.is_qualified()).count()
}

/// Ranked operations of each coin, in first-seen coin order, then the overall
/// summary and every operation ranked together.
pub fn write_operations<W: Write>(out: &mut W, rows: &[OperationRow]) -> io::Result<()> {
    let mut coins: Vec<&str> = Vec::new();
    for row in rows {
        if !coins.contains(&row.coin.as_str()) {
            coins.push(&row.coin);
        }
    }

    for coin in coins {
        let mut group: Vec<&OperationRow> = rows.iter().filter(|r| r.coin == coin).collect();
        group.sort_by(|a, b| compare_operations(&a.operation, &b.operation));
        let qualified = qualified_count(&group);

        writeln!(out)?;
        writeln!(out, "{}", "=".repeat(WIDTH))?;
        writeln!(out, "{coin} OPERATIONS")?;
        writeln!(out, "{}", "=".repeat(WIDTH))?;
        write_operation_header(out, false)?;
        for row in &group {
            write_operation_line(out, row, false)?;
        }
        writeln!(out, "{}", "-".repeat(WIDTH))?;
        writeln!(
            out,
            "{coin}: {} qualified, {} rejected",
            qualified,
            group.len() - qualified
        )?;
    }

    let mut ranked: Vec<&OperationRow> = rows.iter().collect();
    ranked.sort_by(|a, b| compare_operations(&a.operation, &b.operation));
    let qualified = qualified_count(&ranked);

    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(WIDTH))?;
    writeln!(out, "OPERATIONS SUMMARY")?;
    writeln!(out, "{}", "=".repeat(WIDTH))?;
    if ranked.is_empty() {
        return writeln!(out, "No operations to analyse.");
    }
    writeln!(out, "Analysed:  {}", ranked.len())?;
    writeln!(out, "Qualified: {qualified}")?;
    writeln!(out, "Rejected:  {}", ranked.len() - qualified)?;

    writeln!(out)?;
    writeln!(out, "ALL OPERATIONS (ranked)")?;
    write_operation_header(out, true)?;
    for row in ranked {
        write_operation_line(out, row, true)?;
    }
    Ok(())
}

/// Detailed breakdown of a single operation.
pub fn write_evaluation<W: Write>(out: &mut W, op: &Operation) -> io::Result<()> {
    let m = &op.metrics;
    writeln!(out, "Side:           {}", op.side)?;
    writeln!(out, "Bid:            {:.1}c", op.bid * 100.0)?;
    writeln!(out, "Model P(YES):   {:.2}%", op.probability * 100.0)?;
    writeln!(out, "P(success):     {:.2}%", m.success_prob * 100.0)?;
    writeln!(out, "P(loss):        {:.2}%", m.loss_prob * 100.0)?;
    writeln!(out, "Premium:        {:.3}", m.premium)?;
    writeln!(out, "Max loss:       {:.3}", m.max_loss)?;
    writeln!(out, "Edge ratio:     {:.2}x", m.edge_ratio)?;
    writeln!(out, "EV per share:   {:.4}", m.ev)?;
    writeln!(out, "EV:             {:.2}%", m.ev_pct * 100.0)?;
    writeln!(out, "Verdict:        {}", op.verdict)
}

/// Regime summary printed under a single probability.
pub fn write_diagnostics<W: Write>(
    out: &mut W,
    sim: &SimulationResult,
    config: &EngineConfig,
) -> io::Result<()> {
    let d = &sim.diagnostics;
    writeln!(out, "Current price:  {:.4}", sim.current_price)?;
    writeln!(
        out,
        "Profile:        {} ({} bins, {} draws)",
        d.profile.class.label(),
        d.profile.n_bins,
        d.profile.n_sim
    )?;
    writeln!(
        out,
        "Momentum:       {:.4} over {}h (bin {})",
        d.current_momentum, d.momentum_window, d.current_bin
    )?;
    writeln!(out, "Regime bins:    {:?}", d.regime_bins)?;
    writeln!(
        out,
        "Samples:        {} overlapping, {} independent",
        d.pool_size, d.tail_sample_size
    )?;
    writeln!(
        out,
        "Tails:          alpha {:.2}, max/sum {:.3}",
        d.tail.alpha, d.tail.max_to_sum
    )?;
    writeln!(out, "Resampling:     {:?}", d.mode)?;
    writeln!(out, "Seed:           {}", config.seed)
}
