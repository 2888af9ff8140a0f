use crate::config::HttpEnvConfig;
use crate::domain::errors::SourceError;
use anyhow::{Context, Result};
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::de::DeserializeOwned;

pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Creates an HTTP client bounded by the configured timeouts.
    ///
    /// Retry middleware is only attached when `max_retries > 0`; by default
    /// each source gets exactly one attempt per refresh.
    pub fn create_client(config: &HttpEnvConfig) -> Result<ClientWithMiddleware> {
        let client = Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to build HTTP client")?;

        let builder = ClientBuilder::new(client);
        if config.max_retries == 0 {
            return Ok(builder.build());
        }

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        Ok(builder
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build())
    }
}

/// GETs `url` and decodes a JSON body, mapping every failure to a [`SourceError`].
pub async fn get_json<T: DeserializeOwned>(
    client: &ClientWithMiddleware,
    source_name: &str,
    url: &str,
) -> std::result::Result<T, SourceError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_middleware_error(source_name, e))?;

    if !response.status().is_success() {
        return Err(SourceError::Status {
            source_name: source_name.to_string(),
            status: response.status().as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| classify_reqwest_error(source_name, e))?;
    serde_json::from_slice(&body).map_err(|e| SourceError::parse(source_name, e))
}

pub fn classify_middleware_error(source_name: &str, err: reqwest_middleware::Error) -> SourceError {
    match err {
        reqwest_middleware::Error::Reqwest(e) => classify_reqwest_error(source_name, e),
        reqwest_middleware::Error::Middleware(e) => SourceError::Transport {
            source_name: source_name.to_string(),
            reason: e.to_string(),
        },
    }
}

pub fn classify_reqwest_error(source_name: &str, err: reqwest::Error) -> SourceError {
    if err.is_timeout() {
        SourceError::Timeout {
            source_name: source_name.to_string(),
        }
    } else if err.is_decode() {
        SourceError::parse(source_name, err)
    } else {
        SourceError::Transport {
            source_name: source_name.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Helper function to build a URL with query parameters.
/// reqwest-middleware does not expose `.query()`, so the encoded query
/// string is appended to the URL before sending.
pub fn build_url_with_query<K, V>(base_url: &str, params: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    if params.is_empty() {
        return base_url.to_string();
    }

    let query_string = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish();

    if base_url.contains('?') {
        format!("{}&{}", base_url, query_string)
    } else {
        format!("{}?{}", base_url, query_string)
    }
}
