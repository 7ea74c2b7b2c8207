//! Gamma API client for daily event discovery.
//!
//! Crypto price events are published once per resolution date under slugs of
//! the form `{base}-{month}-{day}` (e.g. `bitcoin-above-on-november-27`). The
//! client probes those slugs forward from today and keeps the first event
//! that is still open.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use regime_odds_core::VenueConfig;
use serde::Serialize;
use std::time::Duration;

use crate::error::VenueError;
use crate::http::VenueHttp;
use crate::models::GammaEvent;
use crate::resolution::{time_to_resolution, TimeToResolution};

/// Gamma API base URL.
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

/// An open event together with the time left until it resolves.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredEvent {
    pub event: GammaEvent,
    pub resolution: TimeToResolution,
}

/// Gamma API client.
pub struct GammaClient {
    http: VenueHttp,
    days_ahead: u32,
}

impl GammaClient {
    #[must_use]
    pub fn new(config: &VenueConfig) -> Self {
        Self {
            http: VenueHttp::new(
                &config.gamma_url,
                config.requests_per_minute,
                Duration::from_secs(config.event_timeout_secs),
            ),
            days_ahead: config.days_ahead,
        }
    }

    /// Sets a custom base URL (useful for testing).
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.http.set_base_url(url.into());
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// First event published under `slug`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`VenueError`] when the request fails or the body is not an
    /// event list.
    pub async fn resolve_event(&self, slug: &str) -> Result<Option<GammaEvent>, VenueError> {
        let path = format!("/events?slug={}", urlencoding::encode(slug));
        let events: Vec<GammaEvent> = self.http.get(&path).await?;
        Ok(events.into_iter().next())
    }

    /// Probes the daily slugs of `base_slug` from today onwards and returns
    /// the first open event whose title contains `title_pattern` and whose
    /// end time is still ahead of `now`.
    ///
    /// Lookup failures for individual slugs are logged and skipped.
    pub async fn find_closest_event(
        &self,
        base_slug: &str,
        title_pattern: &str,
        now: DateTime<Utc>,
    ) -> Option<DiscoveredEvent> {
        for slug in generate_date_slugs(base_slug, now.date_naive(), self.days_ahead) {
            let event = match self.resolve_event(&slug).await {
                Ok(Some(event)) => event,
                Ok(None) => continue,
                Err(err) => {
                    tracing::warn!(slug = %slug, error = %err, "event lookup failed");
                    continue;
                }
            };

            if event.closed || !event.title.contains(title_pattern) {
                continue;
            }
            let Some(resolution) = event.end_time().and_then(|end| time_to_resolution(end, now))
            else {
                continue;
            };

            tracing::info!(
                slug = %slug,
                title = %event.title,
                resolves_in = %resolution.label,
                "event discovered"
            );
            return Some(DiscoveredEvent { event, resolution });
        }

        tracing::warn!(base_slug, title_pattern, "no open event found");
        None
    }
}

/// `{base}-{month}-{day}` for `today` and the following `days_ahead - 1`
/// days, with the month spelled out in lowercase.
#[must_use]
pub fn generate_date_slugs(base: &str, today: NaiveDate, days_ahead: u32) -> Vec<String> {
    (0..u64::from(days_ahead))
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .map(|date| {
            let month = date.format("%B").to_string().to_lowercase();
            format!("{base}-{month}-{}", date.day())
        })
        .collect()
}
