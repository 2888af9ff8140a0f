use crate::application::market_functions::MarketFunctions;
use crate::application::{DashboardReader, Providers, RefreshService, StalenessGate};
use crate::config::{Config, Mode};
use crate::domain::ports::{Clock, SnapshotRepository, SystemClock};
use crate::infrastructure::coingecko::CoinGeckoClient;
use crate::infrastructure::mock::{
    MockArticleFetcher, MockCryptoMarket, MockNewsSearch, MockPriceHistory, MockSentimentProvider,
};
use crate::infrastructure::news::{HttpArticleFetcher, NewsApiClient};
use crate::infrastructure::persistence::JsonSnapshotStore;
use crate::infrastructure::sentiment::FearGreedSentimentProvider;
use crate::infrastructure::yahoo::YahooPriceHistoryClient;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Everything a binary needs, wired for the configured mode.
pub struct Services {
    pub config: Arc<Config>,
    pub store: Arc<dyn SnapshotRepository>,
    pub refresher: Arc<RefreshService>,
    pub dashboard: DashboardReader,
    pub functions: MarketFunctions,
}

pub struct ServiceFactory;

impl ServiceFactory {
    pub fn create_providers(config: &Config) -> Result<Providers> {
        let providers = match config.mode {
            Mode::Mock => Providers {
                prices: Arc::new(MockPriceHistory::seeded(&config.watchlist)),
                crypto: Arc::new(MockCryptoMarket::seeded()),
                sentiment: Arc::new(MockSentimentProvider::seeded()),
                news_search: Arc::new(MockNewsSearch::seeded()),
                articles: Arc::new(MockArticleFetcher::new()),
            },
            Mode::Live => Providers {
                prices: Arc::new(YahooPriceHistoryClient::new(config)?),
                crypto: Arc::new(CoinGeckoClient::new(config)?),
                sentiment: Arc::new(FearGreedSentimentProvider::new(config)?),
                news_search: Arc::new(NewsApiClient::new(config)?),
                articles: Arc::new(HttpArticleFetcher::new(config)?),
            },
        };
        Ok(providers)
    }

    pub fn create_store(config: &Config) -> Result<Arc<dyn SnapshotRepository>> {
        let store = JsonSnapshotStore::new(&config.refresh.data_dir, config.refresh.timezone)
            .with_context(|| {
                format!(
                    "Failed to open data directory {}",
                    config.refresh.data_dir.display()
                )
            })?;
        Ok(Arc::new(store))
    }

    pub fn create_services(config: Arc<Config>) -> Result<Services> {
        let providers = Self::create_providers(&config).context("Failed to create upstream clients")?;
        Self::create_services_with(config, providers, Arc::new(SystemClock))
    }

    /// Wires explicit providers and clock, used by tests and offline runs.
    pub fn create_services_with(
        config: Arc<Config>,
        providers: Providers,
        clock: Arc<dyn Clock>,
    ) -> Result<Services> {
        info!(mode = ?config.mode, data_dir = %config.refresh.data_dir.display(), "Creating services");

        let store = Self::create_store(&config)?;
        let functions = MarketFunctions::new(providers.prices.clone());
        let refresher = Arc::new(RefreshService::new(
            config.clone(),
            providers,
            store.clone(),
            clock.clone(),
        ));
        let dashboard = DashboardReader::new(
            store.clone(),
            refresher.clone(),
            StalenessGate::from_config(&config.refresh),
            clock,
        );

        Ok(Services {
            config,
            store,
            refresher,
            dashboard,
            functions,
        })
    }
}
