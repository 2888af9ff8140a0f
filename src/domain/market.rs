use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Market a snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    Equity,
    Crypto,
}

impl Market {
    pub const ALL: [Market; 2] = [Market::Equity, Market::Crypto];

    /// File stem of the persisted snapshot, shared with the dashboard.
    pub fn file_stem(&self) -> &'static str {
        match self {
            Market::Equity => "stock_data",
            Market::Crypto => "crypto_data",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Market::Equity => write!(f, "Stocks"),
            Market::Crypto => write!(f, "Crypto"),
        }
    }
}

impl FromStr for Market {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "equity" | "stock" | "stocks" => Ok(Market::Equity),
            "crypto" => Ok(Market::Crypto),
            _ => anyhow::bail!("Invalid market: {}. Must be 'stock' or 'crypto'", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_from_str() {
        assert_eq!(Market::from_str("Stocks").unwrap(), Market::Equity);
        assert_eq!(Market::from_str("CRYPTO").unwrap(), Market::Crypto);
        assert!(Market::from_str("forex").is_err());
    }

    #[test]
    fn test_file_stems_are_distinct() {
        assert_eq!(Market::Equity.file_stem(), "stock_data");
        assert_eq!(Market::Crypto.file_stem(), "crypto_data");
    }
}
