//! CryptoCompare hourly history (`/data/v2/histohour`).
//!
//! The endpoint returns at most one page of bars per request, so long
//! lookbacks are fetched backwards from now in pages, each ending `offset`
//! hours before the first request.

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use regime_odds_core::{
    HistoryConfig, PriceHistoryProvider, PriceObservation, PriceSeries, ProviderError,
};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::http::get_json;

const HISTOHOUR_PATH: &str = "/data/v2/histohour";
const QUOTE_CURRENCY: &str = "USD";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct HistoHourResponse {
    response: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<HistoHourData>,
}

#[derive(Debug, Deserialize)]
struct HistoHourData {
    #[serde(rename = "Data", default)]
    bars: Vec<HistoHourBar>,
}

#[derive(Debug, Deserialize)]
struct HistoHourBar {
    time: i64,
    close: f64,
}

/// Paged hourly closes from CryptoCompare.
pub struct CryptoCompareProvider {
    http: Client,
    base_url: String,
    lookback_hours: usize,
    page_size: usize,
    page_delay: Duration,
    timeout: Duration,
}

impl CryptoCompareProvider {
    #[must_use]
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.cryptocompare_url.clone(),
            lookback_hours: config.lookback_hours,
            page_size: config.page_size.max(1),
            page_delay: Duration::from_millis(config.page_delay_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_paging(
        mut self,
        lookback_hours: usize,
        page_size: usize,
        page_delay: Duration,
    ) -> Self {
        self.lookback_hours = lookback_hours;
        self.page_size = page_size.max(1);
        self.page_delay = page_delay;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        limit: usize,
        to_ts: Option<i64>,
    ) -> Result<Vec<PriceObservation>, ProviderError> {
        let url = format!("{}{}", self.base_url, HISTOHOUR_PATH);
        let mut query = vec![
            ("fsym", symbol.to_string()),
            ("tsym", QUOTE_CURRENCY.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(ts) = to_ts {
            query.push(("toTs", ts.to_string()));
        }

        let page: HistoHourResponse = get_json(&self.http, &url, &query, self.timeout).await?;
        if page.response != "Success" {
            return Err(ProviderError::Malformed(
                page.message
                    .unwrap_or_else(|| format!("response status {}", page.response)),
            ));
        }

        Ok(page
            .data
            .map(|d| d.bars)
            .unwrap_or_default()
            .into_iter()
            .filter(|bar| bar.close.is_finite() && bar.close > 0.0)
            .filter_map(|bar| {
                DateTime::from_timestamp(bar.time, 0)
                    .map(|timestamp| PriceObservation::new(timestamp, bar.close))
            })
            .collect())
    }
}

#[async_trait]
impl PriceHistoryProvider for CryptoCompareProvider {
    fn name(&self) -> &str {
        "cryptocompare"
    }

    /// Pages that fail with a status or an unsuccessful payload are skipped;
    /// a transport failure aborts the whole fetch.
    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, ProviderError> {
        let symbol = symbol.to_ascii_uppercase();
        let started = Utc::now();
        let mut observations = Vec::new();
        let mut last_error = None;

        let mut offset = 0;
        while offset < self.lookback_hours {
            let limit = self.page_size.min(self.lookback_hours - offset);
            let to_ts = (offset > 0).then(|| {
                let hours = i64::try_from(offset).unwrap_or(i64::MAX);
                (started - ChronoDuration::hours(hours)).timestamp()
            });

            match self.fetch_page(&symbol, limit, to_ts).await {
                Ok(page) => {
                    tracing::debug!(symbol = %symbol, offset, bars = page.len(), "histohour page");
                    observations.extend(page);
                }
                Err(err @ (ProviderError::Network(_) | ProviderError::Timeout(_))) => {
                    return Err(err);
                }
                Err(err) => {
                    tracing::warn!(
                        symbol = %symbol,
                        offset,
                        error = %err,
                        "histohour page skipped"
                    );
                    last_error = Some(err);
                }
            }

            offset += self.page_size;
            if offset < self.lookback_hours && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        if observations.is_empty() {
            return Err(last_error.unwrap_or(ProviderError::Empty));
        }
        Ok(PriceSeries::from_observations(observations))
    }
}
