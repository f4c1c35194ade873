use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::domain::entities::financial_row::{RawFinancialRow, RawFinancialTable};
use crate::domain::error::DomainError;
use crate::domain::ports::financial_data::FinancialDataProvider;
use crate::domain::values::analysis_period::AnalysisPeriod;

/// Business days searched backwards for a close price when a date has no trading.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 5;

/// Collects per-ticker pricing and analyst target data for an analysis month.
pub struct FinancialDataAggregator {
    provider: Arc<dyn FinancialDataProvider>,
    lookback_days: u32,
}

impl FinancialDataAggregator {
    pub fn new(provider: Arc<dyn FinancialDataProvider>) -> Self {
        Self {
            provider,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    /// Load a row for every ticker that has data.
    ///
    /// Recoverable data errors skip the ticker. Any other error aborts the load.
    /// Fails with a data error when no ticker could be loaded.
    pub async fn load(
        &self,
        tickers: &[String],
        period: &AnalysisPeriod,
        today: NaiveDate,
    ) -> Result<RawFinancialTable, DomainError> {
        let mut table = RawFinancialTable::new();
        let mut skipped = 0usize;

        for ticker in tickers {
            if table.contains(ticker) {
                debug!(ticker = %ticker, "duplicate ticker, already loaded");
                continue;
            }

            match self.load_ticker(ticker, period, today).await {
                Ok(row) => {
                    table.insert(row);
                }
                Err(e) if e.is_recoverable() => {
                    skipped += 1;
                    warn!(ticker = %ticker, error = %e, "could not read financial data, skipping");
                }
                Err(e) => {
                    return Err(DomainError::data(format!(
                        "Could not read {ticker} financial data"
                    ))
                    .with_cause(e));
                }
            }
        }

        if table.is_empty() {
            return Err(DomainError::data(
                "Could not load pricing data for any of the supplied tickers",
            ));
        }

        if skipped > 0 {
            // a shrunken universe shifts the decile edges
            warn!(skipped, loaded = table.len(), "tickers skipped for missing financial data");
        }
        info!(loaded = table.len(), requested = tickers.len(), "financial data loaded");
        Ok(table)
    }

    async fn load_ticker(
        &self,
        ticker: &str,
        period: &AnalysisPeriod,
        today: NaiveDate,
    ) -> Result<RawFinancialRow, DomainError> {
        let start = period.start();
        let end = period.capped_end(today);
        let (year, month) = (period.year(), period.month());

        let stdev = self
            .provider
            .target_price_std_dev(ticker, start, end)
            .await?
            .get(year, month)
            .ok_or_else(|| no_target_data(ticker, "standard deviation", year, month))?;
        let mean = self
            .provider
            .target_price_mean(ticker, start, end)
            .await?
            .get(year, month)
            .ok_or_else(|| no_target_data(ticker, "mean", year, month))?;

        let analysis_price = self
            .provider
            .latest_close_price(ticker, end, self.lookback_days)
            .await?;
        let current_price = self
            .provider
            .latest_close_price(ticker, today, self.lookback_days)
            .await?;

        RawFinancialRow::from_prices(ticker, stdev, mean, analysis_price, current_price)
    }
}

fn no_target_data(ticker: &str, measure: &str, year: i32, month: u32) -> DomainError {
    DomainError::data(format!(
        "No target price {measure} for {ticker} in {year}-{month:02}"
    ))
}
