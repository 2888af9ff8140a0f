//! JSON file persistence for market snapshots.
//!
//! One file per market (`stock_data.json`, `crypto_data.json`) holding
//! `{"timestamp": .., "data": {..}}`. Files are replaced through a temp file
//! and a rename in the same directory, so a reader in this or another
//! process sees either the previous or the new snapshot.

use crate::domain::errors::StoreError;
use crate::domain::market::Market;
use crate::domain::ports::SnapshotRepository;
use crate::domain::snapshot::{MarketSnapshot, SnapshotData, format_timestamp, parse_timestamp};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSnapshot {
    timestamp: String,
    data: SnapshotData,
}

pub struct JsonSnapshotStore {
    dir: PathBuf,
    timezone: Tz,
}

impl JsonSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>, timezone: Tz) -> Result<Self, StoreError> {
        let dir = dir.into();
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        }
        Ok(Self { dir, timezone })
    }

    pub fn path_for(&self, market: Market) -> PathBuf {
        self.dir.join(format!("{}.json", market.file_stem()))
    }

    fn write_atomically(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        // Unique temp name so concurrent writers never share a temp file
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));

        if let Err(e) = fs::write(&temp_path, content) {
            fs::remove_file(&temp_path).ok();
            return Err(io_error(&temp_path, e));
        }
        if let Err(e) = fs::rename(&temp_path, path) {
            fs::remove_file(&temp_path).ok();
            return Err(io_error(path, e));
        }
        Ok(())
    }
}

impl SnapshotRepository for JsonSnapshotStore {
    fn load(&self, market: Market) -> Result<Option<MarketSnapshot>, StoreError> {
        let path = self.path_for(market);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
        let persisted: PersistedSnapshot =
            serde_json::from_str(&content).map_err(|e| StoreError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let timestamp =
            parse_timestamp(&persisted.timestamp, self.timezone).ok_or_else(|| {
                StoreError::Corrupt {
                    path: path.display().to_string(),
                    reason: format!("unparseable timestamp {:?}", persisted.timestamp),
                }
            })?;

        Ok(Some(MarketSnapshot {
            market,
            timestamp,
            data: persisted.data,
        }))
    }

    fn save(&self, snapshot: &MarketSnapshot) -> Result<(), StoreError> {
        let path = self.path_for(snapshot.market);
        let persisted = PersistedSnapshot {
            timestamp: format_timestamp(&snapshot.timestamp.with_timezone(&self.timezone)),
            data: snapshot.data.clone(),
        };

        let content = serde_json::to_string_pretty(&persisted).map_err(|e| {
            StoreError::Serialize {
                reason: e.to_string(),
            }
        })?;

        match self.write_atomically(&path, &content) {
            Ok(()) => {
                info!(market = %snapshot.market, path = ?path, timestamp = %persisted.timestamp, "Snapshot saved");
                Ok(())
            }
            Err(e) => {
                error!(market = %snapshot.market, error = %e, "Snapshot save failed, previous snapshot kept");
                Err(e)
            }
        }
    }
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::SentimentReading;
    use crate::domain::snapshot::{NewsItem, RankedAsset, Volatility, VolatilityReading};
    use chrono::TimeZone;
    use chrono_tz::America::New_York;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn create_test_store() -> (JsonSnapshotStore, PathBuf) {
        let unique_id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let temp_dir = std::env::temp_dir().join(format!(
            "marketpulse_test_{}_{}_{}_store",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0),
            unique_id
        ));
        let store = JsonSnapshotStore::new(&temp_dir, New_York).expect("Failed to create test store");
        (store, temp_dir)
    }

    fn cleanup_test_dir(temp_dir: PathBuf) {
        fs::remove_dir_all(temp_dir).ok();
    }

    fn asset(symbol: &str, change: f64) -> RankedAsset {
        RankedAsset {
            symbol: symbol.to_string(),
            name: format!("{} Corp", symbol),
            current_price: 101.337,
            percent_change: change,
        }
    }

    fn sample_snapshot(market: Market) -> MarketSnapshot {
        MarketSnapshot {
            market,
            timestamp: New_York.with_ymd_and_hms(2024, 6, 3, 16, 5, 0).unwrap(),
            data: SnapshotData {
                gainers: vec![asset("NVDA", 4.1234567), asset("AAPL", 0.5)],
                losers: vec![asset("INTC", -3.75)],
                volatility: VolatilityReading::for_market(market, Volatility::Available(12.94)),
                greed_index: Some(SentimentReading::new(63, Some("1717372800".to_string()))),
                news: vec![NewsItem {
                    title: "Chipmakers lead rally".to_string(),
                    url: "https://news.test/chips".to_string(),
                    keywords: vec!["chips".to_string(), "rally".to_string()],
                    text_preview: "Chipmakers led...".to_string(),
                    ..Default::default()
                }],
            },
        }
    }

    #[test]
    fn test_load_nonexistent_returns_none() {
        let (store, temp_dir) = create_test_store();
        assert!(store.load(Market::Equity).unwrap().is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (store, temp_dir) = create_test_store();
        let snapshot = sample_snapshot(Market::Equity);

        store.save(&snapshot).unwrap();
        let loaded = store.load(Market::Equity).unwrap().unwrap();

        assert_eq!(loaded, snapshot);
        assert!(store.load(Market::Crypto).unwrap().is_none());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_file_layout_matches_dashboard_contract() {
        let (store, temp_dir) = create_test_store();
        store.save(&sample_snapshot(Market::Crypto)).unwrap();

        let raw = fs::read_to_string(store.path_for(Market::Crypto)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["timestamp"], "2024-06-03 16:05:00 EDT-0400");
        assert_eq!(value["data"]["volatility"]["volatility_index"], 12.94);
        assert_eq!(value["data"]["greed_index"]["value"], 63);
        assert_eq!(value["data"]["gainers"][0]["price_change_percentage_24h"], 4.1234567);
        assert_eq!(value["data"]["gainers"][0]["name"], "NVDA Corp");
        assert!(value["data"]["news"].is_array());
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let (store, temp_dir) = create_test_store();
        store.save(&sample_snapshot(Market::Equity)).unwrap();
        store.save(&sample_snapshot(Market::Equity)).unwrap();

        let names: Vec<String> = fs::read_dir(&temp_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["stock_data.json".to_string()]);
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_empty_lists_and_missing_sentiment_survive() {
        let (store, temp_dir) = create_test_store();
        let mut snapshot = sample_snapshot(Market::Equity);
        snapshot.data.gainers.clear();
        snapshot.data.losers.clear();
        snapshot.data.news.clear();
        snapshot.data.greed_index = None;
        snapshot.data.volatility = VolatilityReading::for_market(Market::Equity, Volatility::Unavailable);

        store.save(&snapshot).unwrap();
        let loaded = store.load(Market::Equity).unwrap().unwrap();

        assert!(loaded.data.gainers.is_empty());
        assert!(loaded.data.greed_index.is_none());
        assert_eq!(loaded.data.volatility.value(), Volatility::Unavailable);
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let (store, temp_dir) = create_test_store();
        fs::write(store.path_for(Market::Equity), "{\"timestamp\": \"2024-06-03").unwrap();
        assert!(matches!(
            store.load(Market::Equity),
            Err(StoreError::Corrupt { .. })
        ));
        cleanup_test_dir(temp_dir);
    }

    #[test]
    fn test_failed_save_keeps_previous_snapshot() {
        let (store, temp_dir) = create_test_store();
        let snapshot = sample_snapshot(Market::Equity);
        store.save(&snapshot).unwrap();

        let broken = JsonSnapshotStore {
            dir: temp_dir.join("missing_subdir"),
            timezone: New_York,
        };
        assert!(broken.save(&snapshot).is_err());

        let loaded = store.load(Market::Equity).unwrap().unwrap();
        assert_eq!(loaded.data, snapshot.data);
        cleanup_test_dir(temp_dir);
    }
}
