use crate::config::Config;
use crate::domain::errors::SourceError;
use crate::domain::market::Market;
use crate::domain::ports::SentimentProvider;
use crate::domain::sentiment::SentimentReading;
use crate::infrastructure::core::http_client_factory::{HttpClientFactory, get_json};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    #[serde(default)]
    data: Vec<FearGreedData>,
}

#[derive(Debug, Deserialize)]
struct FearGreedData {
    value: serde_json::Value,
    #[serde(default)]
    timestamp: Option<serde_json::Value>,
}

/// Fear & Greed index client, one endpoint per market (alternative.me format).
pub struct FearGreedSentimentProvider {
    client: ClientWithMiddleware,
    stocks_url: String,
    crypto_url: String,
}

impl FearGreedSentimentProvider {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(&config.http)?,
            stocks_url: config.greed_index_url(Market::Equity).to_string(),
            crypto_url: config.greed_index_url(Market::Crypto).to_string(),
        })
    }

    async fn request(&self, market: Market) -> Result<SentimentReading, SourceError> {
        let (source, url) = match market {
            Market::Equity => ("fear_greed_stocks", &self.stocks_url),
            Market::Crypto => ("fear_greed_crypto", &self.crypto_url),
        };

        let body: FearGreedResponse = get_json(&self.client, source, url).await?;
        let data = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| SourceError::empty(source))?;

        let value = parse_score(&data.value).ok_or_else(|| {
            SourceError::parse(source, format!("unusable index value {}", data.value))
        })?;

        let timestamp = data.timestamp.and_then(|t| match t {
            serde_json::Value::String(s) => Some(s),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        });
        // Classification is derived from the score, not taken from upstream
        Ok(SentimentReading::new(value, timestamp))
    }
}

fn parse_score(raw: &serde_json::Value) -> Option<u8> {
    let score = match raw {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (0.0..=100.0)
        .contains(&score)
        .then(|| score.round() as u8)
}

#[async_trait]
impl SentimentProvider for FearGreedSentimentProvider {
    async fn fetch_sentiment(&self, market: Market) -> Option<SentimentReading> {
        match self.request(market).await {
            Ok(reading) => {
                info!(
                    %market,
                    value = reading.value,
                    classification = %reading.value_classification,
                    "Fetched Fear & Greed index"
                );
                Some(reading)
            }
            Err(e) => {
                warn!(%market, error = %e, "Fear & Greed index unavailable");
                None
            }
        }
    }
}
