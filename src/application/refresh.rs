//! The refresh trigger: fetch every category for both markets, aggregate,
//! and replace the persisted snapshots.

use crate::application::aggregator::{self, Movers};
use crate::application::news_enricher::NewsEnricher;
use crate::config::Config;
use crate::domain::market::Market;
use crate::domain::ports::{
    ArticleFetcher, Clock, CryptoMarketProvider, NewsSearchProvider, PriceHistoryProvider,
    SentimentProvider, SnapshotRepository,
};
use crate::domain::quotes::HistoryRange;
use crate::domain::snapshot::{MarketSnapshot, SnapshotData, Volatility, VolatilityReading};
use futures::StreamExt;
use futures::stream;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

pub const VIX_SYMBOL: &str = "^VIX";
/// Trailing window of the crypto realized volatility.
pub const VOLATILITY_DAYS: u32 = 30;

/// Upstream ports used by one refresh.
#[derive(Clone)]
pub struct Providers {
    pub prices: Arc<dyn PriceHistoryProvider>,
    pub crypto: Arc<dyn CryptoMarketProvider>,
    pub sentiment: Arc<dyn SentimentProvider>,
    pub news_search: Arc<dyn NewsSearchProvider>,
    pub articles: Arc<dyn ArticleFetcher>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketOutcome {
    pub market: Market,
    pub persisted: bool,
    pub gainers: usize,
    pub losers: usize,
    pub news: usize,
    pub volatility_available: bool,
    pub sentiment_available: bool,
}

#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub outcomes: Vec<MarketOutcome>,
    pub elapsed: Duration,
}

impl RefreshReport {
    pub fn outcome(&self, market: Market) -> Option<&MarketOutcome> {
        self.outcomes.iter().find(|o| o.market == market)
    }

    pub fn all_persisted(&self) -> bool {
        self.outcomes.iter().all(|o| o.persisted)
    }
}

pub struct RefreshService {
    config: Arc<Config>,
    providers: Providers,
    store: Arc<dyn SnapshotRepository>,
    clock: Arc<dyn Clock>,
    news: NewsEnricher,
}

impl RefreshService {
    pub fn new(
        config: Arc<Config>,
        providers: Providers,
        store: Arc<dyn SnapshotRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let news = NewsEnricher::new(
            providers.news_search.clone(),
            providers.articles.clone(),
            config.refresh.news_article_delay(),
            config.refresh.news_max_articles,
        );
        Self {
            config,
            providers,
            store,
            clock,
            news,
        }
    }

    /// Refreshes both markets. Never fails: missing upstream data is
    /// recorded as absence and a failed save keeps the previous snapshot.
    #[instrument(skip(self), name = "refresh_all")]
    pub async fn refresh_all(&self) -> RefreshReport {
        let started = Instant::now();
        info!("Refresh started");

        let (equity, crypto) = tokio::join!(
            self.refresh_market(Market::Equity),
            self.refresh_market(Market::Crypto)
        );

        let report = RefreshReport {
            outcomes: vec![equity, crypto],
            elapsed: started.elapsed(),
        };
        info!(
            elapsed_ms = report.elapsed.as_millis() as u64,
            all_persisted = report.all_persisted(),
            "Refresh finished"
        );
        report
    }

    async fn refresh_market(&self, market: Market) -> MarketOutcome {
        let snapshot = self.build_snapshot(market).await;
        let data = &snapshot.data;

        let persisted = match self.store.save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!(market = %market, error = %e, "Keeping previous snapshot");
                false
            }
        };

        let outcome = MarketOutcome {
            market,
            persisted,
            gainers: data.gainers.len(),
            losers: data.losers.len(),
            news: data.news.len(),
            volatility_available: data.volatility.value().is_available(),
            sentiment_available: data.greed_index.is_some(),
        };
        info!(
            market = %market,
            persisted,
            gainers = outcome.gainers,
            losers = outcome.losers,
            news = outcome.news,
            volatility = %data.volatility.value(),
            "Market refreshed"
        );
        outcome
    }

    /// Fetches all categories of one market concurrently and assembles the
    /// snapshot, stamped when assembly completes.
    pub async fn build_snapshot(&self, market: Market) -> MarketSnapshot {
        let timezone = self.config.refresh.timezone;
        let started_at = self.clock.now().with_timezone(&timezone);
        let keywords = self.config.news_keywords(market);

        let (movers, volatility, greed_index, news) = tokio::join!(
            self.movers(market),
            self.volatility(market),
            self.providers.sentiment.fetch_sentiment(market),
            self.news.collect(keywords, started_at)
        );

        MarketSnapshot {
            market,
            timestamp: self.clock.now().with_timezone(&timezone),
            data: SnapshotData {
                gainers: movers.gainers,
                losers: movers.losers,
                volatility: VolatilityReading::for_market(market, volatility),
                greed_index,
                news,
            },
        }
    }

    async fn movers(&self, market: Market) -> Movers {
        match market {
            Market::Equity => {
                let tickers: Vec<String> =
                    self.config.watchlist.tickers().map(str::to_string).collect();
                // buffered keeps watchlist order regardless of completion order
                let results: Vec<_> = stream::iter(tickers)
                    .map(|ticker| {
                        let prices = self.providers.prices.clone();
                        async move {
                            let closes =
                                prices.daily_closes(&ticker, HistoryRange::FiveDays).await;
                            let change = aggregator::percent_change(&closes);
                            (ticker, change)
                        }
                    })
                    .buffered(self.config.refresh.fetch_concurrency.max(1))
                    .collect()
                    .await;

                let missing = results.iter().filter(|(_, c)| c.is_none()).count();
                if missing > 0 {
                    warn!(missing, "Equities without a usable price history");
                }
                aggregator::rank_movers(aggregator::equity_quotes(results, &self.config.watchlist))
            }
            Market::Crypto => {
                let coins = self.providers.crypto.markets().await;
                aggregator::rank_movers(aggregator::crypto_quotes(&coins))
            }
        }
    }

    async fn volatility(&self, market: Market) -> Volatility {
        match market {
            Market::Equity => {
                let closes = self
                    .providers
                    .prices
                    .daily_closes(VIX_SYMBOL, HistoryRange::OneDay)
                    .await;
                aggregator::latest_level(&closes)
            }
            Market::Crypto => {
                let prices = self.providers.crypto.daily_prices(VOLATILITY_DAYS).await;
                aggregator::realized_volatility(&prices)
            }
        }
    }
}
