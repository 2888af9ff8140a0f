#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use marketpulse::application::Providers;
use marketpulse::config::{
    Config, DEFAULT_CRYPTO_MARKET_CHART_URL, DEFAULT_PRICE_HISTORY_URL, HttpEnvConfig, Mode,
    RefreshEnvConfig, UpstreamUrls, WatchlistFile,
};
use marketpulse::domain::watchlist::WatchlistEntry;
use marketpulse::infrastructure::mock::{
    MockArticleFetcher, MockCryptoMarket, MockNewsSearch, MockPriceHistory, MockSentimentProvider,
};
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Config rooted in a fresh temp directory, removed on drop.
pub struct TestEnv {
    pub config: Arc<Config>,
    pub dir: PathBuf,
}

impl TestEnv {
    pub fn new(tickers: &[(&str, &str)]) -> Self {
        let dir = std::env::temp_dir().join(format!("marketpulse_it_{}", Uuid::new_v4().simple()));

        let file = WatchlistFile {
            equities: tickers
                .iter()
                .map(|(ticker, name)| WatchlistEntry {
                    ticker: ticker.to_string(),
                    name: name.to_string(),
                })
                .collect(),
            stock_keywords: vec!["stocks".to_string()],
            crypto_keywords: vec!["bitcoin".to_string()],
            urls: UpstreamUrls {
                crypto_gainers_losers: "http://127.0.0.1:9/markets".to_string(),
                crypto_market_chart: DEFAULT_CRYPTO_MARKET_CHART_URL.to_string(),
                greed_index_stocks: "http://127.0.0.1:9/fng/stocks".to_string(),
                greed_index_crypto: "http://127.0.0.1:9/fng/crypto".to_string(),
                news_data: "http://127.0.0.1:9/news".to_string(),
                price_history: DEFAULT_PRICE_HISTORY_URL.to_string(),
            },
        };
        let refresh = RefreshEnvConfig {
            data_dir: dir.clone(),
            news_article_delay_ms: 0,
            ..RefreshEnvConfig::default()
        };

        let config = Config::from_parts(
            Mode::Mock,
            String::new(),
            file,
            HttpEnvConfig::default(),
            refresh,
        );
        Self {
            config: Arc::new(config),
            dir,
        }
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.dir).ok();
    }
}

/// Shared handles to the mocks so tests can inspect call counts.
pub struct Mocks {
    pub prices: Arc<MockPriceHistory>,
    pub crypto: Arc<MockCryptoMarket>,
    pub sentiment: Arc<MockSentimentProvider>,
    pub news_search: Arc<MockNewsSearch>,
    pub articles: Arc<MockArticleFetcher>,
}

impl Mocks {
    /// AAPL +3%, MSFT -1%, GOOG flat; no VIX, crypto, sentiment or news.
    pub fn scenario() -> Self {
        Self {
            prices: Arc::new(
                MockPriceHistory::new()
                    .with_closes("AAPL", vec![100.0, 103.0])
                    .with_closes("MSFT", vec![200.0, 198.0])
                    .with_closes("GOOG", vec![50.0, 50.0]),
            ),
            crypto: Arc::new(MockCryptoMarket::new(Vec::new(), Vec::new())),
            sentiment: Arc::new(MockSentimentProvider::new()),
            news_search: Arc::new(MockNewsSearch::new(Vec::new())),
            articles: Arc::new(MockArticleFetcher::new()),
        }
    }

    pub fn providers(&self) -> Providers {
        Providers {
            prices: self.prices.clone(),
            crypto: self.crypto.clone(),
            sentiment: self.sentiment.clone(),
            news_search: self.news_search.clone(),
            articles: self.articles.clone(),
        }
    }
}

pub const SCENARIO_TICKERS: [(&str, &str); 3] = [
    ("AAPL", "Apple Inc."),
    ("MSFT", "Microsoft Corporation"),
    ("GOOG", "Alphabet Inc."),
];

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 20, 0, 0).unwrap()
}
