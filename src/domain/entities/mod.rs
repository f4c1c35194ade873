pub mod financial_row;
pub mod ticker_universe;
