pub mod coingecko;
pub mod core;
pub mod factory;
pub mod mock;
pub mod news;
pub mod persistence;
pub mod sentiment;
pub mod yahoo;

pub use factory::{ServiceFactory, Services};
