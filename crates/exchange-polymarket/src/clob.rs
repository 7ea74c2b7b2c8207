//! CLOB best-price lookups.

use regime_odds_core::VenueConfig;
use std::time::Duration;

use crate::error::VenueError;
use crate::http::VenueHttp;
use crate::models::{BidAsk, GammaMarket, MarketQuote, PriceResponse, QuoteSide};

/// CLOB API base URL.
pub const CLOB_API_URL: &str = "https://clob.polymarket.com";

pub struct ClobClient {
    http: VenueHttp,
}

impl ClobClient {
    #[must_use]
    pub fn new(config: &VenueConfig) -> Self {
        Self {
            http: VenueHttp::new(
                &config.clob_url,
                config.requests_per_minute,
                Duration::from_secs(config.quote_timeout_secs),
            ),
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.http.set_base_url(url.into());
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Best price of `token_id` on `side`; `Ok(None)` when the book is empty.
    ///
    /// # Errors
    ///
    /// Returns a [`VenueError`] when the request fails.
    pub async fn quote(&self, token_id: &str, side: QuoteSide) -> Result<Option<f64>, VenueError> {
        let path = format!(
            "/price?token_id={}&side={}",
            urlencoding::encode(token_id),
            side.as_str()
        );
        let response: PriceResponse = self.http.get(&path).await?;
        Ok(response.value())
    }

    async fn quote_or_none(&self, token_id: &str, side: QuoteSide) -> Option<f64> {
        match self.quote(token_id, side).await {
            Ok(price) => price,
            Err(err) => {
                tracing::debug!(token_id, side = %side, error = %err, "quote unavailable");
                None
            }
        }
    }

    /// YES and NO bid/ask of a binary market. Token 0 is YES and token 1 is
    /// NO; the BUY side is the bid and the SELL side the ask. `None` when the
    /// market lists fewer than two tokens.
    pub async fn market_quote(&self, market: &GammaMarket) -> Option<MarketQuote> {
        let (yes, no) = (market.yes_token()?, market.no_token()?);

        let (yes_bid, yes_ask, no_bid, no_ask) = tokio::join!(
            self.quote_or_none(yes, QuoteSide::Buy),
            self.quote_or_none(yes, QuoteSide::Sell),
            self.quote_or_none(no, QuoteSide::Buy),
            self.quote_or_none(no, QuoteSide::Sell),
        );

        Some(MarketQuote {
            yes: BidAsk {
                bid: yes_bid,
                ask: yes_ask,
            },
            no: BidAsk {
                bid: no_bid,
                ask: no_ask,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> ClobClient {
        ClobClient::new(&VenueConfig::default()).with_base_url(server.uri())
    }

    async fn mount_price(server: &MockServer, token: &str, side: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("token_id", token))
            .and(query_param("side", side))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_client_creation() {
        let client = ClobClient::new(&VenueConfig::default());
        assert_eq!(client.base_url(), CLOB_API_URL);
    }

    #[tokio::test]
    async fn test_quote() {
        let server = MockServer::start().await;
        mount_price(&server, "111", "BUY", json!({"price": "0.955"})).await;

        let price = client(&server).quote("111", QuoteSide::Buy).await.unwrap();
        assert_eq!(price, Some(0.955));
    }

    #[tokio::test]
    async fn test_market_quote_maps_tokens_and_sides() {
        let server = MockServer::start().await;
        mount_price(&server, "111", "BUY", json!({"price": "0.62"})).await;
        mount_price(&server, "111", "SELL", json!({"price": "0.64"})).await;
        mount_price(&server, "222", "BUY", json!({"price": "0.35"})).await;
        Mock::given(method("GET"))
            .and(path("/price"))
            .and(query_param("token_id", "222"))
            .and(query_param("side", "SELL"))
            .respond_with(ResponseTemplate::new(404).set_body_string("No orderbook"))
            .mount(&server)
            .await;

        let market: GammaMarket = serde_json::from_value(json!({
            "question": "q",
            "clobTokenIds": "[\"111\", \"222\"]"
        }))
        .unwrap();

        let quote = client(&server).market_quote(&market).await.unwrap();
        assert_eq!(quote.yes.bid, Some(0.62));
        assert_eq!(quote.yes.ask, Some(0.64));
        assert_eq!(quote.no.bid, Some(0.35));
        assert_eq!(quote.no.ask, None);
    }

    #[tokio::test]
    async fn test_market_quote_needs_two_tokens() {
        let server = MockServer::start().await;
        let market: GammaMarket =
            serde_json::from_value(json!({"clobTokenIds": "[\"111\"]"})).unwrap();
        assert!(client(&server).market_quote(&market).await.is_none());
    }
}
