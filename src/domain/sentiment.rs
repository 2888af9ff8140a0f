use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentClassification {
    ExtremeFear,
    Fear,
    Neutral,
    Greed,
    ExtremeGreed,
}

impl fmt::Display for SentimentClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExtremeFear => write!(f, "Extreme Fear"),
            Self::Fear => write!(f, "Fear"),
            Self::Neutral => write!(f, "Neutral"),
            Self::Greed => write!(f, "Greed"),
            Self::ExtremeGreed => write!(f, "Extreme Greed"),
        }
    }
}

impl SentimentClassification {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=24 => Self::ExtremeFear,
            25..=44 => Self::Fear,
            45..=55 => Self::Neutral,
            56..=75 => Self::Greed,
            _ => Self::ExtremeGreed,
        }
    }
}

/// One Fear & Greed reading as stored under `greed_index`.
///
/// Upstream sources send the score as a string; it is stored as an integer
/// but both forms are accepted when reading older snapshot files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReading {
    #[serde(deserialize_with = "deserialize_score")]
    pub value: u8,
    pub value_classification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl SentimentReading {
    pub fn new(value: u8, timestamp: Option<String>) -> Self {
        Self {
            value,
            value_classification: SentimentClassification::from_score(value).to_string(),
            timestamp,
        }
    }

    pub fn classification(&self) -> SentimentClassification {
        SentimentClassification::from_score(self.value)
    }
}

fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }

    let raw = match Score::deserialize(deserializer)? {
        Score::Number(n) => n,
        Score::Text(s) => s.trim().parse::<f64>().map_err(serde::de::Error::custom)?,
    };

    if !(0.0..=100.0).contains(&raw) {
        return Err(serde::de::Error::custom(format!(
            "sentiment score {} outside 0-100",
            raw
        )));
    }
    Ok(raw.round() as u8)
}
