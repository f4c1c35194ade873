use serde::Serialize;

use crate::domain::error::DomainError;

/// Simple return between two prices, as a factor (0.10 = +10%).
pub fn return_factor(price_from: f64, price_to: f64) -> f64 {
    (price_to - price_from) / price_from
}

/// Pricing and analyst target figures for one ticker over an analysis window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawFinancialRow {
    pub ticker: String,
    /// Close price at the end of the analysis window.
    pub analysis_price: f64,
    pub target_price_avg: f64,
    /// Standard deviation of analyst targets as a percentage of their mean.
    pub target_price_stdev_pct: f64,
    /// Close price as of today.
    pub current_price: f64,
    pub analyst_expected_return: f64,
    pub actual_return: f64,
}

impl RawFinancialRow {
    /// Derive the dispersion percentage and return factors from raw inputs.
    ///
    /// A non-positive or non-finite target mean or analysis price is reported as a
    /// recoverable data error, since no meaningful ratio can be computed from it.
    pub fn from_prices(
        ticker: impl Into<String>,
        target_price_stdev: f64,
        target_price_avg: f64,
        analysis_price: f64,
        current_price: f64,
    ) -> Result<Self, DomainError> {
        let ticker = ticker.into();

        if !target_price_avg.is_finite() || target_price_avg <= 0.0 {
            return Err(DomainError::data(format!(
                "{ticker} has an unusable target price mean: {target_price_avg}"
            )));
        }
        if !analysis_price.is_finite() || analysis_price <= 0.0 {
            return Err(DomainError::data(format!(
                "{ticker} has an unusable analysis price: {analysis_price}"
            )));
        }
        if !target_price_stdev.is_finite() || !current_price.is_finite() {
            return Err(DomainError::data(format!(
                "{ticker} has non-numeric pricing data"
            )));
        }

        Ok(Self {
            target_price_stdev_pct: target_price_stdev / target_price_avg * 100.0,
            analyst_expected_return: return_factor(analysis_price, target_price_avg),
            actual_return: return_factor(analysis_price, current_price),
            ticker,
            analysis_price,
            target_price_avg,
            current_price,
        })
    }
}

/// Rows collected during one strategy run, keyed by ticker in insertion order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RawFinancialTable {
    rows: Vec<RawFinancialRow>,
}

impl RawFinancialTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row. Returns false and keeps the existing row if the ticker is already present.
    pub fn insert(&mut self, row: RawFinancialRow) -> bool {
        if self.contains(&row.ticker) {
            return false;
        }
        self.rows.push(row);
        true
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.rows.iter().any(|r| r.ticker == ticker)
    }

    pub fn get(&self, ticker: &str) -> Option<&RawFinancialRow> {
        self.rows.iter().find(|r| r.ticker == ticker)
    }

    pub fn rows(&self) -> &[RawFinancialRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<RawFinancialRow> for RawFinancialTable {
    fn from_iter<I: IntoIterator<Item = RawFinancialRow>>(iter: I) -> Self {
        let mut table = RawFinancialTable::new();
        for row in iter {
            table.insert(row);
        }
        table
    }
}
