//! Market functions exposed to the chat assistant.
//!
//! Each function is declared with a JSON schema for its arguments and,
//! when called, answers with a plain numeric string computed from daily
//! price history.

use crate::domain::errors::FunctionError;
use crate::domain::ports::PriceHistoryProvider;
use crate::domain::quotes::HistoryRange;
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use ta::Next;
use ta::indicators::{ExponentialMovingAverage, SimpleMovingAverage};
use tracing::debug;

pub const RSI_PERIOD: usize = 14;
pub const DEFAULT_INDIAN_EXCHANGE: &str = "NS";
const INDIAN_EXCHANGES: [&str; 2] = ["NS", "BO"];

#[derive(Debug, Clone, Serialize)]
pub struct FunctionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

fn ticker_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "ticker": { "type": "string", "description": description }
        },
        "required": ["ticker"]
    })
}

fn windowed_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "ticker": {
                "type": "string",
                "description": "The stock ticker symbol for a company (e.g., AAPL for Apple)"
            },
            "window": {
                "type": "integer",
                "description": "The timeframe to consider when calculating the average"
            }
        },
        "required": ["ticker", "window"]
    })
}

pub fn definitions() -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition {
            name: "get_stock_price",
            description: "Gets the latest stock price given the ticker symbol of a company.",
            parameters: ticker_schema(
                "The stock ticker symbol for a company (for example AAPL for Apple).",
            ),
        },
        FunctionDefinition {
            name: "get_indian_stock_price",
            description: "Gets the latest stock price of an Indian company listed on the NSE or BSE.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "ticker": {
                        "type": "string",
                        "description": "The stock ticker symbol (e.g., RELIANCE, TCS, INFY)"
                    },
                    "exchange": {
                        "type": "string",
                        "description": "The exchange: NS for National Stock Exchange or BO for Bombay Stock Exchange",
                        "enum": INDIAN_EXCHANGES
                    }
                },
                "required": ["ticker"]
            }),
        },
        FunctionDefinition {
            name: "get_crypto_price",
            description: "Gets the latest price of a cryptocurrency in USD.",
            parameters: json!({
                "type": "object",
                "properties": {
                    "crypto_symbol": {
                        "type": "string",
                        "description": "The cryptocurrency symbol (e.g., BTC, ETH)"
                    }
                },
                "required": ["crypto_symbol"]
            }),
        },
        FunctionDefinition {
            name: "calculate_SMA",
            description: "Calculate the simple moving average for a given stock ticker and a window.",
            parameters: windowed_schema(),
        },
        FunctionDefinition {
            name: "calculate_EMA",
            description: "Calculate the exponential moving average for a given stock ticker and a window.",
            parameters: windowed_schema(),
        },
        FunctionDefinition {
            name: "calculate_RSI",
            description: "Calculate the RSI for a given stock ticker.",
            parameters: ticker_schema(
                "The stock ticker symbol for a company (e.g., AAPL for Apple)",
            ),
        },
    ]
}

/// Last simple moving average over `window` closes.
pub fn sma_last(closes: &[f64], window: usize) -> Option<f64> {
    let mut sma = SimpleMovingAverage::new(window).ok()?;
    closes.iter().map(|close| sma.next(*close)).last()
}

/// Last exponential moving average with span `window`, seeded by the first close.
pub fn ema_last(closes: &[f64], window: usize) -> Option<f64> {
    let mut ema = ExponentialMovingAverage::new(window).ok()?;
    closes.iter().map(|close| ema.next(*close)).last()
}

/// Relative strength index from rolling means of gains and losses.
///
/// Partial windows at the start of the series average what is available.
pub fn rsi_last(closes: &[f64], period: usize) -> Option<f64> {
    let mut avg_gain = SimpleMovingAverage::new(period).ok()?;
    let mut avg_loss = SimpleMovingAverage::new(period).ok()?;

    let (gain, loss) = closes
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            (avg_gain.next(delta.max(0.0)), avg_loss.next((-delta).max(0.0)))
        })
        .last()?;

    if loss == 0.0 {
        return if gain == 0.0 { None } else { Some(100.0) };
    }
    Some(100.0 - 100.0 / (1.0 + gain / loss))
}

pub struct MarketFunctions {
    prices: Arc<dyn PriceHistoryProvider>,
}

impl MarketFunctions {
    pub fn new(prices: Arc<dyn PriceHistoryProvider>) -> Self {
        Self { prices }
    }

    pub fn definitions(&self) -> Vec<FunctionDefinition> {
        definitions()
    }

    pub async fn call(&self, name: &str, args: &Value) -> Result<String, FunctionError> {
        debug!(function = name, args = %args, "Calling market function");
        match name {
            "get_stock_price" => {
                let ticker = arg_str(name, args, "ticker")?;
                self.latest_close(&ticker, HistoryRange::OneYear).await
            }
            "get_indian_stock_price" => {
                let ticker = arg_str(name, args, "ticker")?;
                let exchange = match args.get("exchange").and_then(Value::as_str) {
                    Some(exchange) => exchange.trim().to_uppercase(),
                    None => DEFAULT_INDIAN_EXCHANGE.to_string(),
                };
                if !INDIAN_EXCHANGES.contains(&exchange.as_str()) {
                    return Err(invalid(name, format!("unknown exchange {}", exchange)));
                }
                self.latest_close(&format!("{}.{}", ticker, exchange), HistoryRange::OneYear)
                    .await
            }
            "get_crypto_price" => {
                let symbol = arg_str(name, args, "crypto_symbol")?;
                self.latest_close(&format!("{}-USD", symbol), HistoryRange::OneDay)
                    .await
            }
            "calculate_SMA" | "calculate_EMA" => {
                let ticker = arg_str(name, args, "ticker")?;
                let window = arg_window(name, args)?;
                let closes = self.closes(&ticker).await?;
                let value = if name == "calculate_SMA" {
                    sma_last(&closes, window)
                } else {
                    ema_last(&closes, window)
                };
                value
                    .map(|v| v.to_string())
                    .ok_or(FunctionError::NoData { ticker })
            }
            "calculate_RSI" => {
                let ticker = arg_str(name, args, "ticker")?;
                let closes = self.closes(&ticker).await?;
                rsi_last(&closes, RSI_PERIOD)
                    .map(|v| v.to_string())
                    .ok_or(FunctionError::NoData { ticker })
            }
            _ => Err(FunctionError::UnknownFunction {
                name: name.to_string(),
            }),
        }
    }

    async fn closes(&self, ticker: &str) -> Result<Vec<f64>, FunctionError> {
        let closes = self.prices.daily_closes(ticker, HistoryRange::OneYear).await;
        if closes.is_empty() {
            return Err(FunctionError::NoData {
                ticker: ticker.to_string(),
            });
        }
        Ok(closes)
    }

    async fn latest_close(&self, ticker: &str, range: HistoryRange) -> Result<String, FunctionError> {
        self.prices
            .daily_closes(ticker, range)
            .await
            .last()
            .map(|close| close.to_string())
            .ok_or_else(|| FunctionError::NoData {
                ticker: ticker.to_string(),
            })
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> FunctionError {
    FunctionError::InvalidArguments {
        name: name.to_string(),
        reason: reason.into(),
    }
}

fn arg_str(name: &str, args: &Value, key: &str) -> Result<String, FunctionError> {
    args.get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(name, format!("missing string argument {}", key)))
}

/// Accepts integers and numeric strings, since models emit both.
fn arg_window(name: &str, args: &Value) -> Result<usize, FunctionError> {
    let window = match args.get("window") {
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match window {
        Some(w) if w > 0 => Ok(w as usize),
        _ => Err(invalid(name, "window must be a positive integer")),
    }
}
