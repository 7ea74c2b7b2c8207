//! Shared JSON GET helper for history providers.

use regime_odds_core::ProviderError;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest response body kept in a [`ProviderError::Status`].
const MAX_ERROR_BODY: usize = 256;

/// GETs `url` with `query` and decodes the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    url: &str,
    query: &[(&str, String)],
    timeout: Duration,
) -> Result<T, ProviderError> {
    tracing::debug!(url, ?query, "GET");

    let response = http
        .get(url)
        .query(query)
        .header("Accept", "application/json")
        .timeout(timeout)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: truncate(body, MAX_ERROR_BODY),
        });
    }

    let bytes = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&bytes).map_err(|e| ProviderError::Malformed(e.to_string()))
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let cut = (0..=max).rev().find(|&i| text.is_char_boundary(i)).unwrap_or(0);
        text.truncate(cut);
    }
    text
}

pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else if err.is_decode() {
        ProviderError::Malformed(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}
