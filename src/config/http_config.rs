//! HTTP client configuration parsing from environment variables.

use anyhow::{Context, Result};
use std::env;
use std::time::Duration;

/// Browser-like agent; publishers commonly reject default library agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

/// Upstream HTTP configuration
#[derive(Debug, Clone)]
pub struct HttpEnvConfig {
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// 0 means a single attempt per source and refresh.
    pub max_retries: u32,
    pub user_agent: String,
}

impl Default for HttpEnvConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            connect_timeout_secs: 5,
            max_retries: 0,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpEnvConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            timeout_secs: env::var("HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.timeout_secs.to_string())
                .parse::<u64>()
                .context("Failed to parse HTTP_TIMEOUT_SECS")?,
            connect_timeout_secs: env::var("HTTP_CONNECT_TIMEOUT_SECS")
                .unwrap_or_else(|_| defaults.connect_timeout_secs.to_string())
                .parse::<u64>()
                .context("Failed to parse HTTP_CONNECT_TIMEOUT_SECS")?,
            max_retries: env::var("HTTP_MAX_RETRIES")
                .unwrap_or_else(|_| defaults.max_retries.to_string())
                .parse::<u32>()
                .context("Failed to parse HTTP_MAX_RETRIES")?,
            user_agent: env::var("HTTP_USER_AGENT").unwrap_or(defaults.user_agent),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
