use clap::{Parser, Subcommand};

mod commands;
mod report;

use commands::{EvaluateArgs, ProbabilityArgs, ScanArgs};

#[derive(Parser)]
#[command(name = "regime-odds")]
#[command(
    about = "Regime-conditioned Monte Carlo odds for Polymarket crypto price contracts",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price every open above/range contract and rank the operations
    Scan(ScanArgs),
    /// Probability of one strike or range for a symbol and horizon
    Probability(ProbabilityArgs),
    /// Score a single trade against the qualification rules
    Evaluate(EvaluateArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries the tables
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan(args) => commands::run_scan(args).await?,
        Commands::Probability(args) => commands::run_probability(args).await?,
        Commands::Evaluate(args) => commands::run_evaluate(args)?,
    }

    Ok(())
}
