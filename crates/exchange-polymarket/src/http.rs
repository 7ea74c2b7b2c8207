//! Rate-limited JSON GET shared by the Gamma and CLOB clients.

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use crate::error::VenueError;

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

pub(crate) struct VenueHttp {
    http: Client,
    base_url: String,
    rate_limiter: Arc<DirectLimiter>,
    timeout: Duration,
}

impl VenueHttp {
    pub(crate) fn new(base_url: &str, requests_per_minute: u32, timeout: Duration) -> Self {
        let rpm = NonZeroU32::new(requests_per_minute).unwrap_or(nonzero!(60u32));
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(rpm))),
            timeout,
        }
    }

    pub(crate) fn set_base_url(&mut self, url: String) {
        self.base_url = url.trim_end_matches('/').to_string();
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Waits for the rate limiter, then GETs `path` with the fixed timeout.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, VenueError> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(VenueError::Status { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
