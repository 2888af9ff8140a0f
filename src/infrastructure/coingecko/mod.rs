//! CoinGecko market data
//!
//! One batch call for the market-cap ordered listing used to rank crypto
//! movers, and one call for the reference coin's daily chart used for the
//! realized-volatility figure.

use crate::config::Config;
use crate::domain::errors::SourceError;
use crate::domain::ports::CryptoMarketProvider;
use crate::domain::quotes::CoinMarket;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, build_url_with_query, get_json,
};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, warn};

const SOURCE: &str = "coingecko";

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    prices: Vec<(f64, f64)>,
}

pub struct CoinGeckoClient {
    client: ClientWithMiddleware,
    markets_url: String,
    market_chart_url: String,
}

impl CoinGeckoClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(&config.http)?,
            markets_url: config.urls.crypto_gainers_losers.clone(),
            market_chart_url: config.urls.crypto_market_chart.clone(),
        })
    }

    async fn request_markets(&self) -> Result<Vec<CoinMarket>, SourceError> {
        let url = build_url_with_query(
            &self.markets_url,
            &[("vs_currency", "usd"), ("order", "market_cap_desc")],
        );
        get_json(&self.client, SOURCE, &url).await
    }

    async fn request_daily_prices(&self, days: u32) -> Result<Vec<f64>, SourceError> {
        let days = days.to_string();
        let url = build_url_with_query(
            &self.market_chart_url,
            &[("vs_currency", "usd"), ("days", days.as_str()), ("interval", "daily")],
        );
        let chart: MarketChartResponse = get_json(&self.client, SOURCE, &url).await?;
        if chart.prices.is_empty() {
            return Err(SourceError::empty(SOURCE));
        }
        Ok(chart.prices.into_iter().map(|(_, price)| price).collect())
    }
}

#[async_trait]
impl CryptoMarketProvider for CoinGeckoClient {
    async fn markets(&self) -> Vec<CoinMarket> {
        match self.request_markets().await {
            Ok(coins) => {
                info!(coins = coins.len(), "CoinGecko: fetched market listing");
                coins
            }
            Err(e) => {
                warn!(error = %e, "CoinGecko: market listing unavailable");
                Vec::new()
            }
        }
    }

    async fn daily_prices(&self, days: u32) -> Vec<f64> {
        match self.request_daily_prices(days).await {
            Ok(prices) => prices,
            Err(e) => {
                warn!(error = %e, days, "CoinGecko: market chart unavailable");
                Vec::new()
            }
        }
    }
}
