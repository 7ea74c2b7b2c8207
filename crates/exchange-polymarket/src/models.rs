//! Polymarket data models.
//!
//! Gamma encodes several list fields as JSON strings (`"[\"Yes\", \"No\"]"`);
//! they are decoded leniently into plain vectors, empty when unparseable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// A Gamma event: one resolution date holding a ladder of binary markets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GammaEvent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    /// ISO-8601 end time as sent by the API.
    #[serde(rename = "endDate", default)]
    pub end_date: Option<String>,
    /// Missing flags are treated as closed.
    #[serde(default = "closed_by_default")]
    pub closed: bool,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}

const fn closed_by_default() -> bool {
    true
}

impl GammaEvent {
    /// Parsed end time, `None` when absent or unparseable.
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        let raw = self.end_date.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Public event page.
    #[must_use]
    pub fn url(&self) -> String {
        format!("https://polymarket.com/event/{}", self.slug)
    }
}

/// One binary market inside an event.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GammaMarket {
    #[serde(default)]
    pub question: String,
    #[serde(default, deserialize_with = "json_string_list")]
    pub outcomes: Vec<String>,
    #[serde(rename = "outcomePrices", default, deserialize_with = "json_string_list")]
    pub outcome_prices: Vec<String>,
    #[serde(rename = "clobTokenIds", default, deserialize_with = "json_string_list")]
    pub clob_token_ids: Vec<String>,
}

impl GammaMarket {
    /// True when the market lists both outcomes and their prices.
    #[must_use]
    pub fn is_priced(&self) -> bool {
        !self.outcomes.is_empty() && !self.outcome_prices.is_empty()
    }

    /// CLOB token of the first outcome (YES).
    #[must_use]
    pub fn yes_token(&self) -> Option<&str> {
        self.clob_token_ids.first().map(String::as_str)
    }

    /// CLOB token of the second outcome (NO).
    #[must_use]
    pub fn no_token(&self) -> Option<&str> {
        self.clob_token_ids.get(1).map(String::as_str)
    }
}

fn json_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(encoded)) => {
            serde_json::from_str::<Vec<Value>>(&encoded).unwrap_or_default()
        }
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

/// Order-book side queried on the CLOB `/price` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QuoteSide {
    /// Best bid.
    Buy,
    /// Best ask.
    Sell,
}

impl QuoteSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for QuoteSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `/price` response; the price arrives as a string or a number.
#[derive(Debug, Deserialize)]
pub(crate) struct PriceResponse {
    #[serde(default)]
    pub price: Option<Value>,
}

impl PriceResponse {
    pub(crate) fn value(&self) -> Option<f64> {
        match self.price.as_ref()? {
            Value::String(s) => s.trim().parse().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }
}

/// Best bid and ask of one outcome token; `None` when the lookup failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BidAsk {
    pub bid: Option<f64>,
    pub ask: Option<f64>,
}

/// YES / NO quotes of a binary market.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub yes: BidAsk,
    pub no: BidAsk,
}

impl MarketQuote {
    /// YES bid if quoted above zero.
    #[must_use]
    pub fn yes_bid(&self) -> Option<f64> {
        self.yes.bid.filter(|b| *b > 0.0)
    }

    /// NO bid if quoted above zero.
    #[must_use]
    pub fn no_bid(&self) -> Option<f64> {
        self.no.bid.filter(|b| *b > 0.0)
    }
}
