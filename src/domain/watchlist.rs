use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Label used for symbols missing from the watchlist mapping.
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub ticker: String,
    pub name: String,
}

/// Fixed, ordered set of tracked equity tickers.
#[derive(Debug, Clone, Default)]
pub struct Watchlist {
    entries: Vec<WatchlistEntry>,
    names: HashMap<String, String>,
}

impl Watchlist {
    pub fn new(entries: Vec<WatchlistEntry>) -> Self {
        let names = entries
            .iter()
            .map(|e| (e.ticker.clone(), e.name.clone()))
            .collect();
        Self { entries, names }
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.ticker.as_str())
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn display_name(&self, ticker: &str) -> &str {
        self.names
            .get(ticker)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ticker: &str, name: &str) -> WatchlistEntry {
        WatchlistEntry {
            ticker: ticker.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_display_name_lookup() {
        let watchlist = Watchlist::new(vec![entry("AAPL", "Apple Inc."), entry("MSFT", "Microsoft")]);
        assert_eq!(watchlist.display_name("MSFT"), "Microsoft");
        assert_eq!(watchlist.display_name("TSLA"), UNKNOWN_NAME);
    }

    #[test]
    fn test_tickers_keep_configured_order() {
        let watchlist = Watchlist::new(vec![entry("MSFT", "Microsoft"), entry("AAPL", "Apple Inc.")]);
        let tickers: Vec<&str> = watchlist.tickers().collect();
        assert_eq!(tickers, vec!["MSFT", "AAPL"]);
        assert_eq!(watchlist.len(), 2);
    }
}
