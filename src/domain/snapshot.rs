//! Market snapshot model.
//!
//! A snapshot is produced wholesale by one refresh cycle and replaces the
//! previous one for its market. Field names of [`SnapshotData`] are the
//! contract read by the dashboard.

use crate::domain::market::Market;
use crate::domain::sentiment::SentimentReading;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Sentinel written in place of a volatility value that could not be fetched.
pub const UNAVAILABLE_SENTINEL: &str = "N/A";

/// Serialized timestamp layout, e.g. `2024-11-02 10:15:30 EDT-0400`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z%z";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAsset {
    pub symbol: String,
    #[serde(alias = "company_name")]
    pub name: String,
    pub current_price: f64,
    #[serde(alias = "price_change_percentage_24h")]
    pub percent_change: f64,
}

impl RankedAsset {
    pub fn record(&self, market: Market) -> MoverRecord<'_> {
        match market {
            Market::Equity => MoverRecord::Equity {
                symbol: &self.symbol,
                company_name: &self.name,
                current_price: self.current_price,
                percent_change: self.percent_change,
            },
            Market::Crypto => MoverRecord::Crypto {
                symbol: &self.symbol,
                name: &self.name,
                current_price: self.current_price,
                price_change_percentage_24h: self.percent_change,
            },
        }
    }
}

/// A mover as written to disk, keyed the way each market's dashboard
/// page reads it.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum MoverRecord<'a> {
    Equity {
        symbol: &'a str,
        company_name: &'a str,
        current_price: f64,
        percent_change: f64,
    },
    Crypto {
        symbol: &'a str,
        name: &'a str,
        current_price: f64,
        price_change_percentage_24h: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsItem {
    pub title: String,
    pub description: String,
    pub url: String,
    pub source: String,
    pub published_at: String,
    pub api_content: String,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_summary: Option<String>,
    pub keywords: Vec<String>,
    pub authors: Vec<String>,
    pub top_image: String,
    pub movies: Vec<String>,
    pub text_preview: String,
}

/// Volatility value or explicit absence, shared by both markets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Volatility {
    Available(f64),
    Unavailable,
}

impl Volatility {
    pub fn value(&self) -> Option<f64> {
        match self {
            Volatility::Available(v) => Some(*v),
            Volatility::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Volatility::Available(_))
    }
}

impl From<Option<f64>> for Volatility {
    fn from(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Volatility::Available(v),
            _ => Volatility::Unavailable,
        }
    }
}

impl fmt::Display for Volatility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Volatility::Available(v) => write!(f, "{:.2}", v),
            Volatility::Unavailable => write!(f, "{}", UNAVAILABLE_SENTINEL),
        }
    }
}

impl Serialize for Volatility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Volatility::Available(v) => serializer.serialize_f64(*v),
            Volatility::Unavailable => serializer.serialize_str(UNAVAILABLE_SENTINEL),
        }
    }
}

impl<'de> Deserialize<'de> for Volatility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(v)) => Volatility::from(Some(v)),
            Some(Raw::Text(s)) => Volatility::from(s.trim().parse::<f64>().ok()),
            None => Volatility::Unavailable,
        })
    }
}

/// Volatility stored under the per-market key the dashboard reads:
/// `{"vix_level": ..}` for equities, `{"volatility_index": ..}` for crypto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum VolatilityReading {
    #[serde(rename = "vix_level")]
    Vix(Volatility),
    #[serde(rename = "volatility_index")]
    Realized(Volatility),
}

impl VolatilityReading {
    pub fn for_market(market: Market, value: Volatility) -> Self {
        match market {
            Market::Equity => VolatilityReading::Vix(value),
            Market::Crypto => VolatilityReading::Realized(value),
        }
    }

    pub fn value(&self) -> Volatility {
        match self {
            VolatilityReading::Vix(v) | VolatilityReading::Realized(v) => *v,
        }
    }

    pub fn market(&self) -> Market {
        match self {
            VolatilityReading::Vix(_) => Market::Equity,
            VolatilityReading::Realized(_) => Market::Crypto,
        }
    }
}

/// Reading accepts either market's mover keys; writing uses the keys of
/// the market named by the volatility reading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SnapshotData {
    pub gainers: Vec<RankedAsset>,
    pub losers: Vec<RankedAsset>,
    pub volatility: VolatilityReading,
    pub greed_index: Option<SentimentReading>,
    pub news: Vec<NewsItem>,
}

impl SnapshotData {
    pub fn market(&self) -> Market {
        self.volatility.market()
    }
}

impl Serialize for SnapshotData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let market = self.market();
        let mut state = serializer.serialize_struct("SnapshotData", 5)?;
        state.serialize_field("gainers", &mover_records(&self.gainers, market))?;
        state.serialize_field("losers", &mover_records(&self.losers, market))?;
        state.serialize_field("volatility", &self.volatility)?;
        state.serialize_field("greed_index", &self.greed_index)?;
        state.serialize_field("news", &self.news)?;
        state.end()
    }
}

fn mover_records(assets: &[RankedAsset], market: Market) -> Vec<MoverRecord<'_>> {
    assets.iter().map(|a| a.record(market)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarketSnapshot {
    pub market: Market,
    pub timestamp: DateTime<Tz>,
    pub data: SnapshotData,
}

impl MarketSnapshot {
    pub fn formatted_timestamp(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

pub fn format_timestamp(timestamp: &DateTime<Tz>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a persisted timestamp.
///
/// Zone abbreviations (`EDT`, `EST`, `UTC`...) are not parseable and are
/// replaced by whitespace first; a remaining numeric offset is honored,
/// otherwise the wall-clock time is read in `zone`.
pub fn parse_timestamp(raw: &str, zone: Tz) -> Option<DateTime<Tz>> {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_alphabetic() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");

    if let Ok(with_offset) = DateTime::parse_from_str(&cleaned, "%Y-%m-%d %H:%M:%S %z") {
        return Some(with_offset.with_timezone(&zone));
    }

    let wall_clock = cleaned.get(..19)?;
    let naive = NaiveDateTime::parse_from_str(wall_clock, "%Y-%m-%d %H:%M:%S").ok()?;
    zone.from_local_datetime(&naive).earliest()
}
