//! Hourly price history providers.
//!
//! This crate provides:
//! - CryptoCompare paged `histohour` client
//! - CoinGecko `market_chart` client
//! - An ordered fallback chain accepting the first sufficiently long series
//!
//! Every provider implements [`regime_odds_core::PriceHistoryProvider`] and
//! reports failures as a typed [`regime_odds_core::ProviderError`].

mod http;

pub mod coingecko;
pub mod cryptocompare;
pub mod fallback;

pub use coingecko::CoinGeckoProvider;
pub use cryptocompare::CryptoCompareProvider;
pub use fallback::FallbackHistory;
