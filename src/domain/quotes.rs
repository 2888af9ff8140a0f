use serde::{Deserialize, Serialize};

/// Lookback window for a daily price-history request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRange {
    OneDay,
    FiveDays,
    OneYear,
}

impl HistoryRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRange::OneDay => "1d",
            HistoryRange::FiveDays => "5d",
            HistoryRange::OneYear => "1y",
        }
    }
}

/// Close-to-close move over the last two trading days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceChange {
    pub current_price: f64,
    pub percent_change: f64,
}

/// Priced symbol before ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
    pub percent_change: f64,
}

/// One row of the crypto markets listing, ordered by market cap upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    #[serde(default)]
    pub id: String,
    pub symbol: String,
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

impl CoinMarket {
    /// `None` when upstream has no price or 24h change for the coin.
    pub fn to_quote(&self) -> Option<Quote> {
        let current_price = self.current_price?;
        let percent_change = self.price_change_percentage_24h?;
        if !percent_change.is_finite() {
            return None;
        }
        Some(Quote {
            symbol: self.symbol.clone(),
            name: self.name.clone(),
            current_price,
            percent_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_without_change_is_skipped() {
        let coin = CoinMarket {
            id: "tether".to_string(),
            symbol: "usdt".to_string(),
            name: "Tether".to_string(),
            current_price: Some(1.0),
            price_change_percentage_24h: None,
        };
        assert!(coin.to_quote().is_none());
    }

    #[test]
    fn test_coin_markets_payload() {
        let coins: Vec<CoinMarket> = serde_json::from_str(
            r#"[{"id":"bitcoin","symbol":"btc","name":"Bitcoin","current_price":64000.5,
                 "market_cap":1260000000000,"price_change_percentage_24h":1.75}]"#,
        )
        .unwrap();
        let quote = coins[0].to_quote().unwrap();
        assert_eq!(quote.symbol, "btc");
        assert_eq!(quote.percent_change, 1.75);
    }
}
