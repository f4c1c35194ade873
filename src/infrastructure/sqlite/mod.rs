pub mod financial_cache;
pub mod migrations;
