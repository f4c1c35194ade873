mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{tickers, FakeProvider, TickerBehavior};
use recommender::application::strategies::low_price_dispersion::LowPriceDispersionStrategy;
use recommender::domain::error::DomainError;
use recommender::domain::ports::financial_data::FinancialDataProvider;
use recommender::domain::ports::strategy::PortfolioStrategy;

fn provider() -> Arc<dyn FinancialDataProvider> {
    Arc::new(
        FakeProvider::new(2019, 8)
            .with_ticker("WIDE", 8.0, 0.40)
            .with_ticker("TIGHT", 2.0, 0.05)
            .with_ticker("MID", 6.0, 0.10)
            .with_ticker("LOW", 4.0, 0.30),
    )
}

fn strategy(symbols: &[&str], size: usize) -> LowPriceDispersionStrategy {
    LowPriceDispersionStrategy::new(tickers(symbols), 2019, 8, size, provider())
        .unwrap()
        .with_today(Utc.with_ymd_and_hms(2019, 9, 15, 0, 0, 0).unwrap())
}

#[test]
fn test_rejects_empty_ticker_list() {
    let err = LowPriceDispersionStrategy::new(vec![], 2019, 8, 3, provider()).err().unwrap();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(err.to_string().contains("No ticker list was supplied"));
}

#[test]
fn test_rejects_single_ticker() {
    let err = LowPriceDispersionStrategy::new(tickers(&["AAPL"]), 2019, 8, 3, provider())
        .err()
        .unwrap();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(err.to_string().contains("at least 2 ticker symbols"));
}

#[test]
fn test_rejects_zero_portfolio_size() {
    let err = LowPriceDispersionStrategy::new(tickers(&["A", "B"]), 2019, 8, 0, provider())
        .err()
        .unwrap();
    assert!(matches!(err, DomainError::Validation { .. }));
}

#[test]
fn test_rejects_invalid_period() {
    let bad_month = LowPriceDispersionStrategy::new(tickers(&["A", "B"]), 2019, 13, 3, provider());
    assert!(matches!(bad_month.err(), Some(DomainError::Validation { .. })));

    let bad_year = LowPriceDispersionStrategy::new(tickers(&["A", "B"]), 1999, 6, 3, provider());
    assert!(matches!(bad_year.err(), Some(DomainError::Validation { .. })));
}

#[tokio::test]
async fn test_selects_lowest_dispersion_first() {
    let outcome = strategy(&["WIDE", "TIGHT", "MID", "LOW"], 2).run().await.unwrap();

    assert_eq!(outcome.portfolio.tickers(), &["TIGHT", "LOW"]);
    let ranked: Vec<&str> = outcome.ranking.iter().map(|r| r.row.ticker.as_str()).collect();
    assert_eq!(ranked, vec!["TIGHT", "LOW", "MID", "WIDE"]);
    assert!(outcome.ranking.windows(2).all(|w| w[0].decile <= w[1].decile));
}

#[tokio::test]
async fn test_equal_dispersion_orders_by_expected_return() {
    let flat = |mean: f64| TickerBehavior::Data {
        stdev: 0.0,
        mean,
        analysis_price: 100.0,
        current_price: 100.0,
    };
    let provider = Arc::new(
        FakeProvider::new(2019, 8)
            .with("A", flat(110.0))
            .with("B", flat(150.0))
            .with("C", flat(130.0)),
    );
    let strategy = LowPriceDispersionStrategy::new(tickers(&["A", "B", "C"]), 2019, 8, 3, provider)
        .unwrap()
        .with_today(Utc.with_ymd_and_hms(2019, 9, 15, 0, 0, 0).unwrap());

    let outcome = strategy.run().await.unwrap();
    assert_eq!(outcome.portfolio.tickers(), &["B", "C", "A"]);
    assert!(outcome.ranking.iter().all(|r| r.decile == 0));
}

#[tokio::test]
async fn test_portfolio_smaller_than_requested_size() {
    let outcome = strategy(&["TIGHT", "MID", "NOT_COVERED"], 10).run().await.unwrap();
    assert_eq!(outcome.portfolio.len(), 2);
}

#[tokio::test]
async fn test_generate_portfolio_through_trait() {
    let strategy: Box<dyn PortfolioStrategy> = Box::new(strategy(&["WIDE", "TIGHT", "MID", "LOW"], 3));
    assert_eq!(strategy.name(), "LOW_PRICE_DISPERSION");

    let portfolio = strategy.generate_portfolio().await.unwrap();
    assert_eq!(portfolio.strategy_name(), "LOW_PRICE_DISPERSION");
    assert_eq!(portfolio.len(), 3);
    assert_eq!(
        portfolio.data_date(),
        Utc.with_ymd_and_hms(2019, 8, 31, 0, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_data_date_is_today_while_month_in_progress() {
    let provider = Arc::new(
        FakeProvider::new(2019, 9)
            .with_ticker("A", 2.0, 0.1)
            .with_ticker("B", 3.0, 0.1),
    );
    let today = Utc.with_ymd_and_hms(2019, 9, 10, 15, 30, 0).unwrap();
    let strategy = LowPriceDispersionStrategy::new(tickers(&["A", "B"]), 2019, 9, 1, provider)
        .unwrap()
        .with_today(today);

    let outcome = strategy.run().await.unwrap();
    assert_eq!(outcome.portfolio.data_date(), today);
    assert_eq!(outcome.portfolio.tickers(), &["A"]);
}

#[tokio::test]
async fn test_portfolio_json_shape() {
    let outcome = strategy(&["WIDE", "TIGHT"], 1).run().await.unwrap();
    let json = serde_json::to_value(&outcome.portfolio).unwrap();

    assert_eq!(json["strategy_name"], "LOW_PRICE_DISPERSION");
    assert_eq!(json["portfolio"], serde_json::json!(["TIGHT"]));
    assert_eq!(json["data_date"], "2019-08-31T00:00:00Z");
    assert!(json["creation_time"].is_string());
}

#[tokio::test]
async fn test_future_analysis_month_is_rejected() {
    let provider = Arc::new(FakeProvider::new(2030, 1).with_ticker("A", 2.0, 0.1));
    let strategy = LowPriceDispersionStrategy::new(tickers(&["A", "B"]), 2030, 1, 1, provider.clone())
        .unwrap()
        .with_today(Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());

    let err = strategy.run().await.unwrap_err();
    assert!(matches!(err, DomainError::Validation { .. }));
    assert!(err.to_string().contains("2030-01"));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_first_day_of_month_is_accepted() {
    let provider = Arc::new(
        FakeProvider::new(2019, 9)
            .with_ticker("A", 2.0, 0.1)
            .with_ticker("B", 3.0, 0.1),
    );
    let today = Utc.with_ymd_and_hms(2019, 9, 1, 9, 0, 0).unwrap();
    let strategy = LowPriceDispersionStrategy::new(tickers(&["A", "B"]), 2019, 9, 1, provider)
        .unwrap()
        .with_today(today);

    let outcome = strategy.run().await.unwrap();
    assert_eq!(outcome.portfolio.data_date(), today);
}
