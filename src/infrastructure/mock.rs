//! Deterministic in-process providers.
//!
//! Used by `MODE=mock` to run the whole refresh pipeline offline and by the
//! test suites to script upstream behavior.

use crate::application::refresh::VIX_SYMBOL;
use crate::domain::errors::SourceError;
use crate::domain::market::Market;
use crate::domain::news::{ExtractedArticle, RawArticle};
use crate::domain::ports::{
    ArticleFetcher, Clock, CryptoMarketProvider, NewsSearchProvider, PriceHistoryProvider,
    SentimentProvider,
};
use crate::domain::quotes::{CoinMarket, HistoryRange};
use crate::domain::sentiment::SentimentReading;
use crate::domain::watchlist::Watchlist;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

#[derive(Default)]
pub struct MockPriceHistory {
    closes: HashMap<String, Vec<f64>>,
    calls: AtomicUsize,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, symbol: &str, closes: Vec<f64>) -> Self {
        self.closes.insert(symbol.to_string(), closes);
        self
    }

    /// Two-day history per watchlist ticker plus a VIX series, derived from
    /// the ticker bytes so repeated runs produce the same movers.
    pub fn seeded(watchlist: &Watchlist) -> Self {
        let mut mock = Self::new();
        for ticker in watchlist.tickers() {
            let seed: u32 = ticker.bytes().map(u32::from).sum();
            let prev = 50.0 + f64::from(seed % 400);
            let change_pct = (f64::from(seed % 13) - 6.0) * 0.75;
            let current = prev * (1.0 + change_pct / 100.0);
            mock.closes.insert(ticker.to_string(), vec![prev * 0.99, prev, current]);
        }
        mock.with_closes(VIX_SYMBOL, vec![14.2, 13.87])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceHistoryProvider for MockPriceHistory {
    async fn daily_closes(&self, symbol: &str, _range: HistoryRange) -> Vec<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.closes.get(symbol).cloned().unwrap_or_default()
    }
}

#[derive(Default)]
pub struct MockCryptoMarket {
    coins: Vec<CoinMarket>,
    prices: Vec<f64>,
    calls: AtomicUsize,
}

impl MockCryptoMarket {
    pub fn new(coins: Vec<CoinMarket>, prices: Vec<f64>) -> Self {
        Self {
            coins,
            prices,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn seeded() -> Self {
        let coin = |id: &str, symbol: &str, name: &str, price: f64, change: f64| CoinMarket {
            id: id.to_string(),
            symbol: symbol.to_string(),
            name: name.to_string(),
            current_price: Some(price),
            price_change_percentage_24h: Some(change),
        };
        let coins = vec![
            coin("bitcoin", "btc", "Bitcoin", 67_250.0, 1.84),
            coin("ethereum", "eth", "Ethereum", 3_480.5, -0.92),
            coin("tether", "usdt", "Tether", 1.0, 0.01),
            coin("solana", "sol", "Solana", 171.2, 5.37),
            coin("dogecoin", "doge", "Dogecoin", 0.158, -4.11),
            coin("cardano", "ada", "Cardano", 0.452, -1.6),
        ];
        let prices = (0..31)
            .map(|day| 65_000.0 + f64::from(day % 7) * 410.0 - f64::from(day % 3) * 275.0)
            .collect();
        Self::new(coins, prices)
    }

    /// Number of market-listing requests served.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CryptoMarketProvider for MockCryptoMarket {
    async fn markets(&self) -> Vec<CoinMarket> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.coins.clone()
    }

    async fn daily_prices(&self, _days: u32) -> Vec<f64> {
        self.prices.clone()
    }
}

#[derive(Default)]
pub struct MockSentimentProvider {
    readings: HashMap<Market, SentimentReading>,
}

impl MockSentimentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reading(mut self, market: Market, value: u8) -> Self {
        self.readings.insert(market, SentimentReading::new(value, None));
        self
    }

    pub fn seeded() -> Self {
        Self::new()
            .with_reading(Market::Equity, 58)
            .with_reading(Market::Crypto, 71)
    }
}

#[async_trait]
impl SentimentProvider for MockSentimentProvider {
    async fn fetch_sentiment(&self, market: Market) -> Option<SentimentReading> {
        self.readings.get(&market).cloned()
    }
}

#[derive(Default)]
pub struct MockNewsSearch {
    articles: Vec<RawArticle>,
}

impl MockNewsSearch {
    pub fn new(articles: Vec<RawArticle>) -> Self {
        Self { articles }
    }

    pub fn seeded() -> Self {
        let article = |title: &str, slug: &str| RawArticle {
            title: title.to_string(),
            description: format!("{} - market wrap", title),
            url: format!("https://news.mock/{}", slug),
            source: "Mock Wire".to_string(),
            published_at: "2024-06-03T14:00:00Z".to_string(),
            content: format!("{}...", title),
        };
        Self::new(vec![
            article("Stocks edge higher as yields ease", "stocks-higher"),
            article("[Removed]", "removed"),
            article("Bitcoin steadies after volatile week", "bitcoin-steadies"),
            article("Chipmakers extend rally on AI demand", "chip-rally"),
        ])
    }
}

#[async_trait]
impl NewsSearchProvider for MockNewsSearch {
    async fn search(&self, keywords: &[String], _since: DateTime<Tz>) -> Vec<RawArticle> {
        info!(keywords = keywords.len(), "MockNewsSearch: serving {} articles", self.articles.len());
        self.articles.clone()
    }
}

/// Serves a canned body for every url except the ones marked failing.
#[derive(Default)]
pub struct MockArticleFetcher {
    failing_urls: HashSet<String>,
    fetched: Mutex<Vec<String>>,
}

impl MockArticleFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing_urls.insert(url.to_string());
        self
    }

    /// Urls requested so far, in order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ArticleFetcher for MockArticleFetcher {
    async fn fetch_article(&self, url: &str) -> Result<ExtractedArticle, SourceError> {
        if let Ok(mut fetched) = self.fetched.lock() {
            fetched.push(url.to_string());
        }
        if self.failing_urls.contains(url) {
            return Err(SourceError::Timeout {
                source_name: "mock_article".to_string(),
            });
        }
        Ok(ExtractedArticle {
            text: format!(
                "Markets moved today. Analysts said the move in markets reflected earnings. \
                 Traders expect markets to stay volatile this week. Source: {}.",
                url
            ),
            authors: vec!["Mock Reporter".to_string()],
            top_image: format!("{}/lead.jpg", url),
            movies: Vec::new(),
        })
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(now) => *now,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::watchlist::WatchlistEntry;

    #[tokio::test]
    async fn test_seeded_prices_cover_watchlist() {
        let watchlist = Watchlist::new(vec![WatchlistEntry {
            ticker: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
        }]);
        let mock = MockPriceHistory::seeded(&watchlist);
        assert_eq!(mock.daily_closes("AAPL", HistoryRange::FiveDays).await.len(), 3);
        assert_eq!(mock.daily_closes(VIX_SYMBOL, HistoryRange::OneDay).await.len(), 2);
        assert!(mock.daily_closes("TSLA", HistoryRange::FiveDays).await.is_empty());
        assert_eq!(mock.calls(), 3);
    }

    #[test]
    fn test_manual_clock_advances() {
        let start = Utc::now();
        let clock = ManualClock::new(start);
        clock.advance(TimeDelta::hours(25));
        assert_eq!(clock.now() - start, TimeDelta::hours(25));
    }
}
