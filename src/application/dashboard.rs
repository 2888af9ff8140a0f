//! Read API used by the dashboard.
//!
//! Every accessor goes through the staleness gate first: a missing, corrupt
//! or stale snapshot triggers one synchronous refresh before the file is
//! read again.

use crate::application::refresh::RefreshService;
use crate::application::staleness::{Freshness, StalenessGate};
use crate::domain::errors::DashboardError;
use crate::domain::market::Market;
use crate::domain::ports::{Clock, SnapshotRepository};
use crate::domain::snapshot::{MarketSnapshot, NewsItem, RankedAsset, Volatility};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Shown in place of a timestamp when no snapshot can be read.
pub const UNKNOWN_TIMESTAMP: &str = "Unknown";

/// Snapshot age without refreshing, for status reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotStatus {
    pub market: String,
    pub last_updated: Option<String>,
    pub freshness: String,
}

pub struct DashboardReader {
    store: Arc<dyn SnapshotRepository>,
    refresher: Arc<RefreshService>,
    gate: StalenessGate,
    clock: Arc<dyn Clock>,
}

impl DashboardReader {
    pub fn new(
        store: Arc<dyn SnapshotRepository>,
        refresher: Arc<RefreshService>,
        gate: StalenessGate,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            refresher,
            gate,
            clock,
        }
    }

    fn read_current(&self, market: Market) -> Option<MarketSnapshot> {
        match self.store.load(market) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(market = %market, error = %e, "Unreadable snapshot, treating as missing");
                None
            }
        }
    }

    /// Returns a snapshot no older than the staleness window when possible.
    ///
    /// If the refresh could not persist a new snapshot, the previous one is
    /// served even when stale.
    pub async fn snapshot(&self, market: Market) -> Result<MarketSnapshot, DashboardError> {
        let current = self.read_current(market);

        let freshness = self.gate.assess(current.as_ref(), self.clock.now());
        let previous = match (freshness, current) {
            (Freshness::Fresh, Some(snapshot)) => return Ok(snapshot),
            (_, previous) => previous,
        };

        info!(market = %market, freshness = %freshness, "Refreshing before read");
        self.refresher.refresh_all().await;

        match (self.store.load(market), previous) {
            (Ok(Some(snapshot)), _) => Ok(snapshot),
            (Ok(None), previous) => previous.ok_or(DashboardError::Unavailable { market }),
            (Err(e), Some(previous)) => {
                warn!(market = %market, error = %e, "Serving previous snapshot");
                Ok(previous)
            }
            (Err(e), None) => Err(e.into()),
        }
    }

    pub async fn get_last_updated(&self, market: Market) -> String {
        match self.snapshot(market).await {
            Ok(snapshot) => snapshot.formatted_timestamp(),
            Err(e) => {
                warn!(market = %market, error = %e, "No timestamp available");
                UNKNOWN_TIMESTAMP.to_string()
            }
        }
    }

    pub async fn get_gainers(&self, market: Market) -> Result<Vec<RankedAsset>, DashboardError> {
        Ok(self.snapshot(market).await?.data.gainers)
    }

    pub async fn get_losers(&self, market: Market) -> Result<Vec<RankedAsset>, DashboardError> {
        Ok(self.snapshot(market).await?.data.losers)
    }

    pub async fn get_volatility(&self, market: Market) -> Result<Volatility, DashboardError> {
        Ok(self.snapshot(market).await?.data.volatility.value())
    }

    /// Fear & Greed score, `None` when the index was unavailable at refresh.
    pub async fn get_sentiment(&self, market: Market) -> Result<Option<u8>, DashboardError> {
        Ok(self
            .snapshot(market)
            .await?
            .data
            .greed_index
            .map(|reading| reading.value))
    }

    pub async fn get_news(&self, market: Market) -> Result<Vec<NewsItem>, DashboardError> {
        Ok(self.snapshot(market).await?.data.news)
    }

    pub fn status(&self, market: Market) -> SnapshotStatus {
        let current = self.read_current(market);
        let freshness = self.gate.assess(current.as_ref(), self.clock.now());
        SnapshotStatus {
            market: market.to_string(),
            last_updated: current.map(|s| s.formatted_timestamp()),
            freshness: freshness.to_string(),
        }
    }
}
