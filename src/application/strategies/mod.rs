pub mod low_price_dispersion;
