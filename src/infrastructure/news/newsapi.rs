use crate::config::Config;
use crate::domain::errors::SourceError;
use crate::domain::news::RawArticle;
use crate::domain::ports::NewsSearchProvider;
use crate::infrastructure::core::http_client_factory::{
    HttpClientFactory, build_url_with_query, get_json,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, warn};

const SOURCE: &str = "newsapi";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    #[serde(default)]
    source: Option<ApiSource>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    name: Option<String>,
}

impl From<ApiArticle> for RawArticle {
    fn from(a: ApiArticle) -> Self {
        RawArticle {
            title: a.title.unwrap_or_default(),
            description: a.description.unwrap_or_default(),
            url: a.url.unwrap_or_default(),
            source: a.source.and_then(|s| s.name).unwrap_or_default(),
            published_at: a.published_at.unwrap_or_default(),
            content: a.content.unwrap_or_default(),
        }
    }
}

/// NewsAPI `everything` search.
pub struct NewsApiClient {
    client: ClientWithMiddleware,
    url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: HttpClientFactory::create_client(&config.http)?,
            url: config.urls.news_data.clone(),
            api_key: config.newsapi_key.clone(),
        })
    }

    async fn request(
        &self,
        keywords: &[String],
        since: DateTime<Tz>,
    ) -> Result<Vec<RawArticle>, SourceError> {
        let url = search_url(&self.url, &self.api_key, keywords, since);
        let body: EverythingResponse = get_json(&self.client, SOURCE, &url).await?;
        if body.status != "ok" {
            return Err(SourceError::parse(
                SOURCE,
                body.message.unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        Ok(body.articles.into_iter().map(RawArticle::from).collect())
    }
}

/// Full `everything` request URL. `from` is sent in UTC with an explicit
/// `Z`, since NewsAPI reads an offset-less timestamp as UTC.
pub fn search_url(
    base_url: &str,
    api_key: &str,
    keywords: &[String],
    since: DateTime<Tz>,
) -> String {
    let query = build_query(keywords);
    let from = since
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();
    build_url_with_query(
        base_url,
        &[
            ("q", query.as_str()),
            ("apiKey", api_key),
            ("language", "en"),
            ("sortBy", "popularity"),
            ("from", from.as_str()),
        ],
    )
}

pub fn build_query(keywords: &[String]) -> String {
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>()
        .join(" OR ")
}

#[async_trait]
impl NewsSearchProvider for NewsApiClient {
    async fn search(&self, keywords: &[String], since: DateTime<Tz>) -> Vec<RawArticle> {
        match self.request(keywords, since).await {
            Ok(articles) => {
                info!(articles = articles.len(), "NewsAPI: search completed");
                articles
            }
            Err(e) => {
                warn!(error = %e, "NewsAPI: search unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use chrono_tz::America::New_York;

    #[test]
    fn test_build_query() {
        let keywords = vec!["bitcoin".to_string(), " ".to_string(), "crypto market".to_string()];
        assert_eq!(build_query(&keywords), "bitcoin OR crypto market");
    }

    #[test]
    fn test_search_url_sends_window_start_in_utc() {
        let now = New_York.with_ymd_and_hms(2026, 10, 18, 1, 58, 21).unwrap();
        let since = now - TimeDelta::days(1);
        let url = search_url(
            "https://news.test/v2/everything",
            "key",
            &["stocks".to_string()],
            since,
        );

        let parsed = url::Url::parse(&url).unwrap();
        let from = parsed
            .query_pairs()
            .find(|(k, _)| k == "from")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        assert_eq!(from, "2026-10-17T05:58:21Z");

        let start = DateTime::parse_from_rfc3339(&from).unwrap();
        assert_eq!(now.signed_duration_since(start), TimeDelta::hours(24));
    }

    #[test]
    fn test_search_url_in_winter_offset() {
        let since = New_York.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let url = search_url("https://news.test/v2/everything", "key", &[], since);
        assert!(url.ends_with("from=2024-01-15T14%3A30%3A00Z"));
    }

    #[test]
    fn test_everything_payload_with_nulls() {
        let body: EverythingResponse = serde_json::from_str(
            r#"{"status":"ok","totalResults":2,"articles":[
                {"source":{"id":null,"name":"Reuters"},"author":null,"title":"Dow closes higher",
                 "description":null,"url":"https://news.test/a","urlToImage":null,
                 "publishedAt":"2024-06-03T14:00:00Z","content":"Dow rose..."},
                {"source":{"id":null,"name":null},"title":"[Removed]","url":"https://removed.com"}]}"#,
        )
        .unwrap();
        let articles: Vec<RawArticle> = body.articles.into_iter().map(RawArticle::from).collect();
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].description, "");
        assert!(articles[0].has_usable_title());
        assert!(!articles[1].has_usable_title());
    }

    #[test]
    fn test_error_payload() {
        let body: EverythingResponse = serde_json::from_str(
            r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#,
        )
        .unwrap();
        assert_eq!(body.status, "error");
        assert!(body.articles.is_empty());
        assert_eq!(body.message.as_deref(), Some("Your API key is invalid."));
    }
}
