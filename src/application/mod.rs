pub mod aggregator;
pub mod export_cache;
pub mod ranking;
pub mod recommendation;
pub mod strategies;
pub mod ticker_universe;
