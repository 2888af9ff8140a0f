//! MarketPulse command line
//!
//! One-shot access to the refresh trigger, the dashboard read API and the
//! market function registry.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use marketpulse::config::Config;
use marketpulse::domain::market::Market;
use marketpulse::infrastructure::ServiceFactory;
use serde_json::{Value, json};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Market data refresh and snapshot reader", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch both markets now and replace the stored snapshots
    Refresh,
    /// Print a market snapshot, refreshing it first when missing or stale
    Show {
        /// Market to read (stock or crypto)
        market: String,
    },
    /// Print snapshot age per market without refreshing
    Status,
    /// Print the declared market functions and their argument schemas
    Functions,
    /// Call a market function with JSON arguments
    Call {
        /// Function name, e.g. get_stock_price
        name: String,

        /// Arguments as a JSON object
        #[arg(default_value = "{}")]
        args: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so stdout stays machine readable
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);
    let services = ServiceFactory::create_services(config)?;

    match cli.command {
        Commands::Refresh => {
            let report = services.refresher.refresh_all().await;
            for outcome in &report.outcomes {
                println!(
                    "{:<7} persisted={} gainers={} losers={} news={} volatility={} sentiment={}",
                    outcome.market.to_string(),
                    outcome.persisted,
                    outcome.gainers,
                    outcome.losers,
                    outcome.news,
                    outcome.volatility_available,
                    outcome.sentiment_available
                );
            }
            println!("Refresh took {:.1}s", report.elapsed.as_secs_f64());
            if !report.all_persisted() {
                anyhow::bail!("At least one snapshot could not be saved");
            }
        }
        Commands::Show { market } => {
            let market = Market::from_str(&market)?;
            let snapshot = services.dashboard.snapshot(market).await?;
            let output = json!({
                "market": market.to_string(),
                "last_updated": snapshot.formatted_timestamp(),
                "data": snapshot.data,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Status => {
            let statuses: Vec<_> = Market::ALL
                .iter()
                .map(|market| services.dashboard.status(*market))
                .collect();
            println!("{}", serde_json::to_string_pretty(&statuses)?);
        }
        Commands::Functions => {
            println!(
                "{}",
                serde_json::to_string_pretty(&services.functions.definitions())?
            );
        }
        Commands::Call { name, args } => {
            let args: Value = serde_json::from_str(&args)
                .with_context(|| format!("Arguments for {} are not valid JSON", name))?;
            info!(function = %name, "Calling market function");
            let result = services.functions.call(&name, &args).await?;
            println!("{}", result);
        }
    }

    Ok(())
}
