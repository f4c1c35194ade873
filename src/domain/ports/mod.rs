pub mod export_source;
pub mod financial_data;
pub mod object_store;
pub mod strategy;
