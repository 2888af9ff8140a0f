pub mod price_history;

pub use price_history::YahooPriceHistoryClient;
