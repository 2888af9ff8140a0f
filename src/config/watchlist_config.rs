//! Watchlist file: tracked equities, news keywords and upstream endpoints.
//!
//! Read once at startup. A missing file, bad JSON, an empty watchlist or a
//! missing required endpoint is a fatal configuration error.

use crate::domain::watchlist::{Watchlist, WatchlistEntry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_PRICE_HISTORY_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
pub const DEFAULT_CRYPTO_MARKET_CHART_URL: &str =
    "https://api.coingecko.com/api/v3/coins/bitcoin/market_chart";

/// Named upstream endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpstreamUrls {
    pub crypto_gainers_losers: String,
    #[serde(default = "default_crypto_market_chart")]
    pub crypto_market_chart: String,
    pub greed_index_stocks: String,
    pub greed_index_crypto: String,
    pub news_data: String,
    #[serde(default = "default_price_history")]
    pub price_history: String,
}

fn default_crypto_market_chart() -> String {
    DEFAULT_CRYPTO_MARKET_CHART_URL.to_string()
}

fn default_price_history() -> String {
    DEFAULT_PRICE_HISTORY_URL.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistFile {
    #[serde(rename = "US30")]
    pub equities: Vec<WatchlistEntry>,
    pub stock_keywords: Vec<String>,
    pub crypto_keywords: Vec<String>,
    pub urls: UpstreamUrls,
}

impl WatchlistFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read watchlist config {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid watchlist config {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: WatchlistFile =
            serde_json::from_str(content).context("Failed to parse watchlist JSON")?;
        file.validate()?;
        Ok(file)
    }

    fn validate(&self) -> Result<()> {
        if self.equities.is_empty() {
            anyhow::bail!("Watchlist US30 must contain at least one ticker");
        }
        if let Some(blank) = self.equities.iter().find(|e| e.ticker.trim().is_empty()) {
            anyhow::bail!("Watchlist entry {:?} has an empty ticker", blank.name);
        }
        if self.stock_keywords.is_empty() || self.crypto_keywords.is_empty() {
            anyhow::bail!("stock_keywords and crypto_keywords must not be empty");
        }
        Ok(())
    }

    pub fn watchlist(&self) -> Watchlist {
        Watchlist::new(self.equities.clone())
    }
}
