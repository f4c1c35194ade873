//! Low price dispersion strategy.
//!
//! Recommends stocks whose analysts agree most on a price target (lowest
//! dispersion of targets relative to their mean) and, among those, the ones
//! with the highest expected return to that target.
//!
//! Analysis runs against a historical month so recommendations can be
//! back-tested: targets and the analysis price come from that month, while
//! the current price shows how the pick actually performed.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::application::aggregator::FinancialDataAggregator;
use crate::application::ranking::{rank, RankedRow};
use crate::domain::error::DomainError;
use crate::domain::ports::financial_data::FinancialDataProvider;
use crate::domain::ports::strategy::PortfolioStrategy;
use crate::domain::values::analysis_period::AnalysisPeriod;
use crate::domain::values::portfolio::Portfolio;

/// Result of a strategy run: the portfolio and the full ranking behind it.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    pub portfolio: Portfolio,
    pub ranking: Vec<RankedRow>,
}

pub struct LowPriceDispersionStrategy {
    ticker_list: Vec<String>,
    period: AnalysisPeriod,
    portfolio_size: usize,
    today: DateTime<Utc>,
    aggregator: FinancialDataAggregator,
}

impl LowPriceDispersionStrategy {
    pub const STRATEGY_NAME: &'static str = "LOW_PRICE_DISPERSION";

    pub fn new(
        ticker_list: Vec<String>,
        year: i32,
        month: u32,
        portfolio_size: usize,
        provider: Arc<dyn FinancialDataProvider>,
    ) -> Result<Self, DomainError> {
        if ticker_list.is_empty() {
            return Err(DomainError::validation("No ticker list was supplied"));
        }
        if ticker_list.len() < 2 {
            return Err(DomainError::validation(
                "You must supply at least 2 ticker symbols",
            ));
        }
        if portfolio_size == 0 {
            return Err(DomainError::validation("Portfolio size must be at least 1"));
        }

        Ok(Self {
            ticker_list,
            period: AnalysisPeriod::new(year, month)?,
            portfolio_size,
            today: Utc::now(),
            aggregator: FinancialDataAggregator::new(provider),
        })
    }

    /// Evaluate current prices as of `today` instead of the wall clock.
    pub fn with_today(mut self, today: DateTime<Utc>) -> Self {
        self.today = today;
        self
    }

    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.aggregator = self.aggregator.with_lookback_days(lookback_days);
        self
    }

    pub fn period(&self) -> &AnalysisPeriod {
        &self.period
    }

    pub fn portfolio_size(&self) -> usize {
        self.portfolio_size
    }

    /// Load data, rank it and build the portfolio.
    pub async fn run(&self) -> Result<StrategyOutcome, DomainError> {
        let today = self.today.date_naive();
        if self.period.start() > today {
            return Err(DomainError::validation(format!(
                "Analysis period {}-{:02} has not started as of {today}",
                self.period.year(),
                self.period.month()
            )));
        }

        let table = self
            .aggregator
            .load(&self.ticker_list, &self.period, today)
            .await?;

        let ranking = rank(&table);
        let tickers: Vec<String> = ranking
            .iter()
            .take(self.portfolio_size)
            .map(|r| r.row.ticker.clone())
            .collect();

        info!(
            strategy = Self::STRATEGY_NAME,
            year = self.period.year(),
            month = self.period.month(),
            selected = tickers.len(),
            "portfolio generated"
        );

        let portfolio = Portfolio::new(
            Utc::now(),
            self.period.data_date(self.today),
            Self::STRATEGY_NAME,
            tickers,
        );

        Ok(StrategyOutcome { portfolio, ranking })
    }
}

#[async_trait]
impl PortfolioStrategy for LowPriceDispersionStrategy {
    fn name(&self) -> &'static str {
        Self::STRATEGY_NAME
    }

    async fn generate_portfolio(&self) -> Result<Portfolio, DomainError> {
        Ok(self.run().await?.portfolio)
    }
}
