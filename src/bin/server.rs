//! MarketPulse Server - headless refresh daemon
//!
//! Refreshes both market snapshots at start-up and then on a fixed
//! interval, until Ctrl+C. A refresh in progress is allowed to finish.
//!
//! # Usage
//! ```sh
//! REFRESH_INTERVAL_HOURS=24 cargo run --bin server
//! ```
//!
//! # Environment Variables
//! - `MODE` - `live` or `mock` (default: live)
//! - `NEWSAPI_KEY` - required in live mode
//! - `REFRESH_INTERVAL_HOURS` - hours between refreshes (default: 24)

use anyhow::Result;
use marketpulse::application::RefreshScheduler;
use marketpulse::config::Config;
use marketpulse::infrastructure::ServiceFactory;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{Level, info};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false).pretty();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    info!("MarketPulse Server {} starting...", env!("CARGO_PKG_VERSION"));

    let config = Arc::new(Config::from_env()?);
    info!(
        "Configuration loaded: Mode={:?}, Equities={}, DataDir={}",
        config.mode,
        config.watchlist.len(),
        config.refresh.data_dir.display()
    );

    let services = ServiceFactory::create_services(config.clone())?;
    let scheduler = RefreshScheduler::new(services.refresher.clone(), config.refresh.refresh_interval());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn(scheduler.run(shutdown_rx));

    info!("Server running. Press Ctrl+C to shutdown.");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Waiting for the current refresh...");
    shutdown_tx.send(true).ok();

    let runs = handle.await?;
    info!(runs, "Exiting.");

    Ok(())
}
