//! Ports between the refresh logic and the outside world.
//!
//! Upstream ports never fail: an implementation that cannot reach its source
//! logs the cause and returns the absence form (empty, `None`). The article
//! fetcher is the exception, since the news enrichment step decides what a
//! failed article means.

use crate::domain::errors::{SourceError, StoreError};
use crate::domain::market::Market;
use crate::domain::news::{ExtractedArticle, RawArticle};
use crate::domain::quotes::{CoinMarket, HistoryRange};
use crate::domain::sentiment::SentimentReading;
use crate::domain::snapshot::MarketSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Daily closes, oldest first. Empty when the source is unavailable.
    async fn daily_closes(&self, symbol: &str, range: HistoryRange) -> Vec<f64>;
}

#[async_trait]
pub trait CryptoMarketProvider: Send + Sync {
    /// Market-cap ordered listing with 24h change, one batch request.
    async fn markets(&self) -> Vec<CoinMarket>;

    /// Daily closing prices of the reference coin over the trailing `days`.
    async fn daily_prices(&self, days: u32) -> Vec<f64>;
}

#[async_trait]
pub trait SentimentProvider: Send + Sync {
    /// Latest Fear & Greed reading for the market.
    async fn fetch_sentiment(&self, market: Market) -> Option<SentimentReading>;
}

#[async_trait]
pub trait NewsSearchProvider: Send + Sync {
    /// Articles matching any keyword published after `since`, most popular first.
    async fn search(&self, keywords: &[String], since: DateTime<Tz>) -> Vec<RawArticle>;
}

#[async_trait]
pub trait ArticleFetcher: Send + Sync {
    async fn fetch_article(&self, url: &str) -> Result<ExtractedArticle, SourceError>;
}

/// Durable home of the latest snapshot per market.
pub trait SnapshotRepository: Send + Sync {
    /// `Ok(None)` when no snapshot has been written yet.
    fn load(&self, market: Market) -> Result<Option<MarketSnapshot>, StoreError>;

    /// Replaces the stored snapshot; readers see the old or the new one, never a mix.
    fn save(&self, snapshot: &MarketSnapshot) -> Result<(), StoreError>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
