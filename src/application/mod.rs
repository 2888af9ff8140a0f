// Pure aggregation of upstream data
pub mod aggregator;

// News pipeline
pub mod news_enricher;
pub mod summarizer;

// Refresh trigger and its schedule
pub mod refresh;
pub mod scheduler;

// Read side
pub mod dashboard;
pub mod staleness;

// Chat assistant functions
pub mod market_functions;

pub use dashboard::DashboardReader;
pub use refresh::{Providers, RefreshReport, RefreshService};
pub use scheduler::RefreshScheduler;
pub use staleness::StalenessGate;
