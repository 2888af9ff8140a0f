use crate::config::Config;
use crate::domain::errors::SourceError;
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::quotes::HistoryRange;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, build_url_with_query, get_json,
};
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{debug, warn};

const SOURCE: &str = "yahoo";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

/// Daily closes from the Yahoo chart API.
pub struct YahooPriceHistoryClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl YahooPriceHistoryClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(&config.http)?,
            base_url: config.urls.price_history.trim_end_matches('/').to_string(),
        })
    }

    async fn request_closes(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<f64>, SourceError> {
        let encoded: String = url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect();
        let url = build_url_with_query(
            &format!("{}/{}", self.base_url, encoded),
            &[("range", range.as_str()), ("interval", "1d")],
        );

        let response: ChartResponse = get_json(&self.client, SOURCE, &url).await?;
        parse_closes(response)
    }
}

fn parse_closes(response: ChartResponse) -> Result<Vec<f64>, SourceError> {
    if let Some(error) = response.chart.error {
        return Err(SourceError::parse(
            SOURCE,
            format!("{} - {}", error.code, error.description),
        ));
    }

    let data = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| SourceError::empty(SOURCE))?;
    let series = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| SourceError::empty(SOURCE))?;

    // Rows without a close (halted or in-progress sessions) are dropped.
    Ok(series
        .close
        .into_iter()
        .flatten()
        .filter(|c| c.is_finite())
        .collect())
}

#[async_trait]
impl PriceHistoryProvider for YahooPriceHistoryClient {
    async fn daily_closes(&self, symbol: &str, range: HistoryRange) -> Vec<f64> {
        match self.request_closes(symbol, range).await {
            Ok(closes) => {
                debug!(symbol, points = closes.len(), "Yahoo: fetched daily closes");
                closes
            }
            Err(e) => {
                warn!(symbol, error = %e, "Yahoo: price history unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::aggregator;
    use crate::application::refresh::VIX_SYMBOL;
    use crate::config::HttpEnvConfig;
    use crate::domain::snapshot::Volatility;
    use crate::infrastructure::core::http_client_factory::tests::silent_server;

    #[tokio::test]
    async fn test_vix_timeout_reads_as_unavailable() {
        let addr = silent_server().await;
        let http = HttpEnvConfig {
            timeout_secs: 1,
            connect_timeout_secs: 1,
            ..HttpEnvConfig::default()
        };
        let client = YahooPriceHistoryClient {
            client: HttpClientFactory::create_client(&http).unwrap(),
            base_url: format!("http://{}/v8/finance/chart", addr),
        };

        let closes = client.daily_closes(VIX_SYMBOL, HistoryRange::OneDay).await;
        assert!(closes.is_empty());
        assert_eq!(aggregator::latest_level(&closes), Volatility::Unavailable);
    }

    #[test]
    fn test_parse_closes_skips_nulls() {
        let response: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":[{"meta":{"symbol":"AAPL"},"timestamp":[1,2,3],
                "indicators":{"quote":[{"close":[189.5,null,191.25]}]}}],"error":null}}"#,
        )
        .unwrap();
        assert_eq!(parse_closes(response).unwrap(), vec![189.5, 191.25]);
    }

    #[test]
    fn test_parse_closes_reports_upstream_error() {
        let response: ChartResponse = serde_json::from_str(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        )
        .unwrap();
        let err = parse_closes(response).unwrap_err();
        assert!(err.to_string().contains("delisted"));
    }

    #[test]
    fn test_parse_closes_empty_result() {
        let response: ChartResponse =
            serde_json::from_str(r#"{"chart":{"result":[],"error":null}}"#).unwrap();
        assert!(matches!(parse_closes(response), Err(SourceError::Empty { .. })));
    }
}
