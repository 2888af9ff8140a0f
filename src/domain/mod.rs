// Snapshot model and its parts
pub mod market;
pub mod news;
pub mod quotes;
pub mod sentiment;
pub mod snapshot;
pub mod watchlist;

// Port interfaces
pub mod ports;

// Domain-specific error types
pub mod errors;
