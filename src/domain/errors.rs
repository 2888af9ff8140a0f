use crate::domain::market::Market;
use thiserror::Error;

/// Failure of one upstream source. Contained at the client boundary and
/// turned into an absence value; only logged.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name}: request failed: {reason}")]
    Transport { source_name: String, reason: String },

    #[error("{source_name}: request timed out")]
    Timeout { source_name: String },

    #[error("{source_name}: upstream returned status {status}")]
    Status { source_name: String, status: u16 },

    #[error("{source_name}: invalid payload: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("{source_name}: no data returned")]
    Empty { source_name: String },
}

impl SourceError {
    pub fn parse(source_name: &str, reason: impl ToString) -> Self {
        SourceError::Parse {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn empty(source_name: &str) -> Self {
        SourceError::Empty {
            source_name: source_name.to_string(),
        }
    }
}

/// Errors related to snapshot persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to serialize snapshot: {reason}")]
    Serialize { reason: String },

    #[error("Corrupt snapshot file {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Errors surfaced by the dashboard read API
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("No {market} snapshot available after refresh")]
    Unavailable { market: Market },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors related to the market function registry
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("Function {name} not found")]
    UnknownFunction { name: String },

    #[error("Invalid arguments for {name}: {reason}")]
    InvalidArguments { name: String, reason: String },

    #[error("No price data for {ticker}")]
    NoData { ticker: String },
}
