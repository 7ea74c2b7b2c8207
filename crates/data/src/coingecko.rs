//! CoinGecko hourly market chart (`/api/v3/coins/{id}/market_chart`).

use async_trait::async_trait;
use chrono::DateTime;
use regime_odds_core::{
    CoinList, HistoryConfig, PriceHistoryProvider, PriceObservation, PriceSeries, ProviderError,
};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::http::get_json;

#[derive(Debug, Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

/// Hourly prices from CoinGecko, addressed by coin id rather than ticker.
pub struct CoinGeckoProvider {
    http: Client,
    base_url: String,
    lookback_days: u32,
    timeout: Duration,
    /// Uppercased ticker to CoinGecko coin id.
    ids: HashMap<String, String>,
}

impl CoinGeckoProvider {
    #[must_use]
    pub fn new(config: &HistoryConfig, coins: &CoinList) -> Self {
        let ids = coins
            .iter()
            .map(|c| (c.symbol.to_ascii_uppercase(), c.coingecko_id.clone()))
            .collect();
        Self {
            http: Client::new(),
            base_url: config.coingecko_url.clone(),
            lookback_days: config.lookback_days,
            timeout: Duration::from_secs(config.timeout_secs),
            ids,
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn coin_id(&self, symbol: &str) -> Option<&str> {
        self.ids.get(&symbol.to_ascii_uppercase()).map(String::as_str)
    }
}

#[async_trait]
impl PriceHistoryProvider for CoinGeckoProvider {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, ProviderError> {
        let id = self
            .coin_id(symbol)
            .ok_or_else(|| ProviderError::Unsupported(symbol.to_string()))?;

        let url = format!("{}/api/v3/coins/{}/market_chart", self.base_url, id);
        let query = [
            ("vs_currency", "usd".to_string()),
            ("days", self.lookback_days.to_string()),
            ("interval", "hourly".to_string()),
        ];
        let chart: MarketChart = get_json(&self.http, &url, &query, self.timeout).await?;

        let observations: Vec<PriceObservation> = chart
            .prices
            .into_iter()
            .filter(|(_, price)| price.is_finite() && *price > 0.0)
            .filter_map(|(ms, price)| {
                DateTime::from_timestamp_millis(ms as i64)
                    .map(|timestamp| PriceObservation::new(timestamp, price))
            })
            .collect();

        if observations.is_empty() {
            return Err(ProviderError::Empty);
        }
        tracing::debug!(symbol, id, points = observations.len(), "market chart");
        Ok(PriceSeries::from_observations(observations))
    }
}
