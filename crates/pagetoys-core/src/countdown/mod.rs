//! Event countdown widget.
//!
//! [`Countdown`] is pure: given a "now" it renders the remaining time.
//! [`CountdownTicker`] wraps it in a once-per-second state machine that stops
//! itself when the target passes.

mod ticker;

pub use ticker::{CountdownTicker, TickerState};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_FORMAT: &str = "{days}天 {hours}時 {minutes}分 {seconds}秒";

const SEC_MS: i64 = 1_000;
const MIN_MS: i64 = 60 * SEC_MS;
const HOUR_MS: i64 = 60 * MIN_MS;
const DAY_MS: i64 = 24 * HOUR_MS;

/// Whole units left until the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// Split a positive millisecond distance, flooring each unit.
    pub fn from_millis(distance_ms: i64) -> Self {
        Self {
            days: distance_ms / DAY_MS,
            hours: (distance_ms % DAY_MS) / HOUR_MS,
            minutes: (distance_ms % HOUR_MS) / MIN_MS,
            seconds: (distance_ms % MIN_MS) / SEC_MS,
        }
    }

    pub fn total_secs(&self) -> i64 {
        ((self.days * 24 + self.hours) * 60 + self.minutes) * 60 + self.seconds
    }

    pub fn render(&self, format: &str) -> String {
        format
            .replace("{days}", &self.days.to_string())
            .replace("{hours}", &self.hours.to_string())
            .replace("{minutes}", &self.minutes.to_string())
            .replace("{seconds}", &self.seconds.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    pub target: DateTime<Utc>,
    pub end_text: String,
    pub format: String,
}

impl Countdown {
    pub fn new(target: DateTime<Utc>, end_text: impl Into<String>) -> Self {
        Self {
            target,
            end_text: end_text.into(),
            format: DEFAULT_FORMAT.into(),
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// `None` once the target has been reached.
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Remaining> {
        let distance = (self.target - now).num_milliseconds();
        if distance <= 0 {
            return None;
        }
        Some(Remaining::from_millis(distance))
    }

    pub fn is_finished_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining_at(now).is_none()
    }

    pub fn render_at(&self, now: DateTime<Utc>) -> String {
        match self.remaining_at(now) {
            Some(remaining) => remaining.render(&self.format),
            None => self.end_text.clone(),
        }
    }
}

/// Parse an RFC 3339 timestamp, or a naive `YYYY-MM-DD HH:MM:SS`
/// (also with a `T` separator) taken as UTC.
pub fn parse_target(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidTimestamp(raw.to_string()))
}
