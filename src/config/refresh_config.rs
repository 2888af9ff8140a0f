//! Refresh, staleness and storage configuration parsing from environment variables.

use anyhow::{Context, Result};
use chrono::TimeDelta;
use chrono_tz::Tz;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// One year; bounds the staleness window and the refresh interval.
pub const MAX_HOURS: u64 = 24 * 365;

/// Refresh cycle environment configuration
#[derive(Debug, Clone)]
pub struct RefreshEnvConfig {
    pub data_dir: PathBuf,
    /// Zone shared by snapshot writers and readers.
    pub timezone: Tz,
    pub staleness_hours: i64,
    pub refresh_interval_hours: u64,
    pub fetch_concurrency: usize,
    pub news_article_delay_ms: u64,
    pub news_max_articles: usize,
}

impl Default for RefreshEnvConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            timezone: chrono_tz::America::New_York,
            staleness_hours: 24,
            refresh_interval_hours: 24,
            fetch_concurrency: 4,
            news_article_delay_ms: 1000,
            news_max_articles: 5,
        }
    }
}

impl RefreshEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let timezone = match env::var("MARKET_TIMEZONE") {
            Ok(name) => name
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("Invalid MARKET_TIMEZONE {}: {}", name, e))?,
            Err(_) => defaults.timezone,
        };

        let fetch_concurrency = Self::parse_usize("FETCH_CONCURRENCY", defaults.fetch_concurrency)?;
        if fetch_concurrency == 0 {
            anyhow::bail!("FETCH_CONCURRENCY must be at least 1");
        }

        let config = Self {
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            timezone,
            staleness_hours: env::var("STALENESS_HOURS")
                .unwrap_or_else(|_| defaults.staleness_hours.to_string())
                .parse::<i64>()
                .context("Failed to parse STALENESS_HOURS")?,
            refresh_interval_hours: env::var("REFRESH_INTERVAL_HOURS")
                .unwrap_or_else(|_| defaults.refresh_interval_hours.to_string())
                .parse::<u64>()
                .context("Failed to parse REFRESH_INTERVAL_HOURS")?,
            fetch_concurrency,
            news_article_delay_ms: env::var("NEWS_ARTICLE_DELAY_MS")
                .unwrap_or_else(|_| defaults.news_article_delay_ms.to_string())
                .parse::<u64>()
                .context("Failed to parse NEWS_ARTICLE_DELAY_MS")?,
            news_max_articles: Self::parse_usize("NEWS_MAX_ARTICLES", defaults.news_max_articles)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects windows and intervals outside `1..=MAX_HOURS`.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_HOURS as i64).contains(&self.staleness_hours) {
            anyhow::bail!(
                "STALENESS_HOURS must be between 1 and {}, got {}",
                MAX_HOURS,
                self.staleness_hours
            );
        }
        if !(1..=MAX_HOURS).contains(&self.refresh_interval_hours) {
            anyhow::bail!(
                "REFRESH_INTERVAL_HOURS must be between 1 and {}, got {}",
                MAX_HOURS,
                self.refresh_interval_hours
            );
        }
        Ok(())
    }

    pub fn staleness_window(&self) -> TimeDelta {
        TimeDelta::hours(self.staleness_hours)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_hours * 3600)
    }

    pub fn news_article_delay(&self) -> Duration {
        Duration::from_millis(self.news_article_delay_ms)
    }

    fn parse_usize(key: &str, default: usize) -> Result<usize> {
        env::var(key)
            .unwrap_or_else(|_| default.to_string())
            .parse::<usize>()
            .context(format!("Failed to parse {}", key))
    }
}
