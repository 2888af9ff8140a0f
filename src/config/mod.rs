//! Configuration module for MarketPulse.
//!
//! Environment variables (optionally from `.env`) plus the watchlist file,
//! loaded once at startup into an immutable [`Config`] that is handed to
//! every component constructor.

mod http_config;
mod refresh_config;
mod watchlist_config;

pub use http_config::{DEFAULT_USER_AGENT, HttpEnvConfig};
pub use refresh_config::RefreshEnvConfig;
pub use watchlist_config::{
    DEFAULT_CRYPTO_MARKET_CHART_URL, DEFAULT_PRICE_HISTORY_URL, UpstreamUrls, WatchlistFile,
};

use crate::domain::market::Market;
use crate::domain::watchlist::Watchlist;
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Where market data comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Live,
    Mock,
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "live" => Ok(Mode::Live),
            "mock" => Ok(Mode::Mock),
            _ => anyhow::bail!("Invalid MODE: {}. Must be 'live' or 'mock'", s),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub mode: Mode,
    pub newsapi_key: String,
    pub watchlist: Watchlist,
    pub stock_keywords: Vec<String>,
    pub crypto_keywords: Vec<String>,
    pub urls: UpstreamUrls,
    pub http: HttpEnvConfig,
    pub refresh: RefreshEnvConfig,
}

impl Config {
    /// Load configuration from environment variables and the watchlist file.
    pub fn from_env() -> Result<Self> {
        let mode_str = env::var("MODE").unwrap_or_else(|_| "live".to_string());
        let mode = Mode::from_str(&mode_str)?;

        let newsapi_key = env::var("NEWSAPI_KEY").unwrap_or_default();
        if mode == Mode::Live && newsapi_key.trim().is_empty() {
            anyhow::bail!("NEWSAPI_KEY is required in live mode");
        }

        let config_path = env::var("MARKETPULSE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| Path::new("data").join("config.json"));
        let file = WatchlistFile::load(&config_path)?;

        let http = HttpEnvConfig::from_env().context("Failed to load HTTP config")?;
        let refresh = RefreshEnvConfig::from_env().context("Failed to load refresh config")?;

        Ok(Self::from_parts(mode, newsapi_key, file, http, refresh))
    }

    pub fn from_parts(
        mode: Mode,
        newsapi_key: String,
        file: WatchlistFile,
        http: HttpEnvConfig,
        refresh: RefreshEnvConfig,
    ) -> Self {
        Self {
            mode,
            newsapi_key,
            watchlist: file.watchlist(),
            stock_keywords: file.stock_keywords,
            crypto_keywords: file.crypto_keywords,
            urls: file.urls,
            http,
            refresh,
        }
    }

    pub fn news_keywords(&self, market: Market) -> &[String] {
        match market {
            Market::Equity => &self.stock_keywords,
            Market::Crypto => &self.crypto_keywords,
        }
    }

    pub fn greed_index_url(&self, market: Market) -> &str {
        match market {
            Market::Equity => &self.urls.greed_index_stocks,
            Market::Crypto => &self.urls.greed_index_crypto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!(Mode::from_str("LIVE").unwrap(), Mode::Live);
        assert_eq!(Mode::from_str("mock").unwrap(), Mode::Mock);
        assert!(Mode::from_str("paper").is_err());
    }

    #[test]
    fn test_per_market_lookups() {
        let file = WatchlistFile {
            equities: vec![crate::domain::watchlist::WatchlistEntry {
                ticker: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
            }],
            stock_keywords: vec!["stocks".to_string()],
            crypto_keywords: vec!["bitcoin".to_string()],
            urls: UpstreamUrls {
                crypto_gainers_losers: "https://coins.test/markets".to_string(),
                crypto_market_chart: DEFAULT_CRYPTO_MARKET_CHART_URL.to_string(),
                greed_index_stocks: "https://fng.test/stocks".to_string(),
                greed_index_crypto: "https://fng.test/crypto".to_string(),
                news_data: "https://news.test/everything".to_string(),
                price_history: DEFAULT_PRICE_HISTORY_URL.to_string(),
            },
        };
        let config = Config::from_parts(
            Mode::Mock,
            String::new(),
            file,
            HttpEnvConfig::default(),
            RefreshEnvConfig::default(),
        );

        assert_eq!(config.news_keywords(Market::Crypto), ["bitcoin".to_string()]);
        assert_eq!(config.greed_index_url(Market::Equity), "https://fng.test/stocks");
    }
}
