pub mod analysis_period;
pub mod decile;
pub mod environment;
pub mod portfolio;
