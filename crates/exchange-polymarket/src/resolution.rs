//! Time remaining until an event resolves.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Leftover minutes at which the horizon is rounded up to the next hour.
const ROUND_UP_MINUTES: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeToResolution {
    pub seconds: i64,
    /// `"2d 3h 15min"`, or `"3h 15min"` under a day.
    pub label: String,
    /// Horizon handed to the engine, never below 1.
    pub hours_rounded: u32,
}

/// `None` when `end` is not strictly after `now`.
#[must_use]
pub fn time_to_resolution(end: DateTime<Utc>, now: DateTime<Utc>) -> Option<TimeToResolution> {
    let seconds = (end - now).num_seconds();
    if seconds <= 0 {
        return None;
    }

    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;

    let label = if days > 0 {
        format!("{days}d {hours}h {minutes}min")
    } else {
        format!("{hours}h {minutes}min")
    };

    let whole_hours = seconds / 3600;
    let rounded = if minutes >= ROUND_UP_MINUTES {
        whole_hours + 1
    } else {
        whole_hours
    };
    let hours_rounded = u32::try_from(rounded.max(1)).unwrap_or(u32::MAX);

    Some(TimeToResolution {
        seconds,
        label,
        hours_rounded,
    })
}
