//! Polymarket venue integration for crypto price events.
//!
//! This crate provides:
//! - Gamma event discovery over the daily `{coin}-above-on-…` and
//!   `{coin}-price-on-…` slugs
//! - CLOB best bid / ask lookups per outcome token
//! - Strike and range parsing of market questions
//! - A per-coin [`MarketSnapshot`] cache
//!
//! # Example
//!
//! ```no_run
//! use regime_odds_core::{AppConfig, CoinList};
//! use regime_odds_polymarket::MarketScanner;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let scanner = MarketScanner::new(&config.venue);
//!     for coin in CoinList::default().iter() {
//!         let snapshot = scanner.snapshot(coin, chrono::Utc::now()).await;
//!         println!("{}: {} events", snapshot.symbol, snapshot.events().count());
//!     }
//! }
//! ```

pub mod clob;
pub mod error;
pub mod gamma;
mod http;
pub mod models;
pub mod parsing;
pub mod resolution;
pub mod snapshot;

pub use clob::{ClobClient, CLOB_API_URL};
pub use error::VenueError;
pub use gamma::{generate_date_slugs, DiscoveredEvent, GammaClient, GAMMA_API_URL};
pub use models::{BidAsk, GammaEvent, GammaMarket, MarketQuote, QuoteSide};
pub use parsing::{extract_range, extract_strike, format_usd, range_label};
pub use resolution::{time_to_resolution, TimeToResolution};
pub use snapshot::{
    Contract, ContractKind, ContractQuote, EventSnapshot, MarketScanner, MarketSnapshot,
};
