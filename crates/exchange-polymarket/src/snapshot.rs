//! Per-coin view of the open "above" and "price" events.

use chrono::{DateTime, Utc};
use regime_odds_core::{CoinConfig, VenueConfig};
use regime_odds_engine::{KeyedCache, PriceRange};
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use crate::clob::ClobClient;
use crate::gamma::{DiscoveredEvent, GammaClient};
use crate::models::MarketQuote;
use crate::parsing::{extract_range, extract_strike, format_usd, range_label};
use crate::resolution::TimeToResolution;

/// Which family of questions an event holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContractKind {
    /// "Will the price be above $X?"
    Above,
    /// "Will the price be between $A and $B?" and its open-ended siblings.
    Range,
}

/// What a single binary market pays out on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Contract {
    Above { strike: f64 },
    Range(PriceRange),
}

impl Contract {
    /// Parses a market question; `None` when no usable strike or range is
    /// found.
    #[must_use]
    pub fn parse(kind: ContractKind, question: &str) -> Option<Self> {
        match kind {
            ContractKind::Above => {
                let strike = extract_strike(question);
                (strike > 0.0).then_some(Self::Above { strike })
            }
            ContractKind::Range => extract_range(question).map(Self::Range),
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Above { strike } => format_usd(*strike),
            Self::Range(range) => range_label(range),
        }
    }

    fn sort_key(&self) -> f64 {
        match self {
            Self::Above { strike } => *strike,
            Self::Range(range) => range.sort_key(),
        }
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContractQuote {
    pub question: String,
    pub contract: Contract,
    /// `None` when the market has fewer than two CLOB tokens.
    pub quote: Option<MarketQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventSnapshot {
    pub title: String,
    pub slug: String,
    pub url: String,
    pub resolution: TimeToResolution,
    /// Sorted by strike, or by the lower bound of the range.
    pub contracts: Vec<ContractQuote>,
}

/// Open events of one coin, as seen at scan time.
#[derive(Debug, Clone, Serialize)]
pub struct MarketSnapshot {
    pub symbol: String,
    pub above: Option<EventSnapshot>,
    pub price: Option<EventSnapshot>,
}

impl MarketSnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.above.is_none() && self.price.is_none()
    }

    /// Both events with the kind of contract they hold.
    pub fn events(&self) -> impl Iterator<Item = (ContractKind, &EventSnapshot)> {
        [
            (ContractKind::Above, self.above.as_ref()),
            (ContractKind::Range, self.price.as_ref()),
        ]
        .into_iter()
        .filter_map(|(kind, event)| event.map(|e| (kind, e)))
    }
}

/// Discovers and quotes events, caching one snapshot per coin for the life
/// of the scanner.
pub struct MarketScanner {
    gamma: GammaClient,
    clob: ClobClient,
    cache: KeyedCache<String, MarketSnapshot>,
}

impl MarketScanner {
    #[must_use]
    pub fn new(config: &VenueConfig) -> Self {
        Self::with_clients(GammaClient::new(config), ClobClient::new(config))
    }

    #[must_use]
    pub fn with_clients(gamma: GammaClient, clob: ClobClient) -> Self {
        Self {
            gamma,
            clob,
            cache: KeyedCache::new(),
        }
    }

    /// Previously built snapshot of `symbol`, if any.
    #[must_use]
    pub fn cached(&self, symbol: &str) -> Option<Arc<MarketSnapshot>> {
        self.cache.get(&symbol.to_ascii_uppercase())
    }

    /// Snapshot of `coin`, built on first use.
    pub async fn snapshot(&self, coin: &CoinConfig, now: DateTime<Utc>) -> Arc<MarketSnapshot> {
        let key = coin.symbol.to_ascii_uppercase();
        self.cache
            .get_or_try_init(&key, || async {
                Ok::<_, Infallible>(self.build(coin, now).await)
            })
            .await
            .unwrap_or_else(|never| match never {})
    }

    async fn build(&self, coin: &CoinConfig, now: DateTime<Utc>) -> MarketSnapshot {
        let above = match self
            .gamma
            .find_closest_event(&coin.slug_above, &coin.pattern_above, now)
            .await
        {
            Some(found) => Some(self.quote_event(found, ContractKind::Above).await),
            None => None,
        };
        let price = match self
            .gamma
            .find_closest_event(&coin.slug_price, &coin.pattern_price, now)
            .await
        {
            Some(found) => Some(self.quote_event(found, ContractKind::Range).await),
            None => None,
        };

        tracing::info!(
            symbol = %coin.symbol,
            above = above.as_ref().map_or(0, |e| e.contracts.len()),
            ranges = price.as_ref().map_or(0, |e| e.contracts.len()),
            "market snapshot built"
        );

        MarketSnapshot {
            symbol: coin.symbol.to_ascii_uppercase(),
            above,
            price,
        }
    }

    async fn quote_event(&self, found: DiscoveredEvent, kind: ContractKind) -> EventSnapshot {
        let DiscoveredEvent { event, resolution } = found;
        let url = event.url();

        let mut contracts = Vec::with_capacity(event.markets.len());
        for market in event.markets.into_iter().filter(|m| m.is_priced()) {
            let Some(contract) = Contract::parse(kind, &market.question) else {
                tracing::debug!(question = %market.question, "no strike in question, skipped");
                continue;
            };
            let quote = self.clob.market_quote(&market).await;
            contracts.push(ContractQuote {
                question: market.question,
                contract,
                quote,
            });
        }
        contracts.sort_by(|a, b| a.contract.sort_key().total_cmp(&b.contract.sort_key()));

        EventSnapshot {
            title: event.title,
            slug: event.slug,
            url,
            resolution,
            contracts,
        }
    }
}
