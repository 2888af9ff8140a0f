use crate::config::RefreshEnvConfig;
use crate::domain::snapshot::{MarketSnapshot, parse_timestamp};
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Missing,
    Stale,
    Fresh,
}

impl fmt::Display for Freshness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Freshness::Missing => write!(f, "missing"),
            Freshness::Stale => write!(f, "stale"),
            Freshness::Fresh => write!(f, "fresh"),
        }
    }
}

/// Decides whether a persisted snapshot is too old to serve.
///
/// Age is measured in the configured zone, so writers and readers agree on
/// the meaning of the stored wall-clock timestamp.
#[derive(Debug, Clone, Copy)]
pub struct StalenessGate {
    window: TimeDelta,
    timezone: Tz,
}

impl StalenessGate {
    pub fn new(window: TimeDelta, timezone: Tz) -> Self {
        Self { window, timezone }
    }

    pub fn from_config(config: &RefreshEnvConfig) -> Self {
        Self::new(config.staleness_window(), config.timezone)
    }

    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Stale when strictly older than the window.
    pub fn is_stale(&self, timestamp: &DateTime<Tz>, now: DateTime<Utc>) -> bool {
        let now = now.with_timezone(&self.timezone);
        now.signed_duration_since(timestamp) > self.window
    }

    /// Unparseable timestamps count as stale.
    pub fn is_stale_raw(&self, raw: &str, now: DateTime<Utc>) -> bool {
        match parse_timestamp(raw, self.timezone) {
            Some(timestamp) => self.is_stale(&timestamp, now),
            None => true,
        }
    }

    pub fn assess(&self, snapshot: Option<&MarketSnapshot>, now: DateTime<Utc>) -> Freshness {
        match snapshot {
            None => Freshness::Missing,
            Some(s) if self.is_stale(&s.timestamp, now) => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }
}
