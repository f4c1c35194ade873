//! Financial data provider port.
//!
//! Errors of kind [`DomainError::Data`] mean the data is unavailable for this
//! ticker (not covered, nothing in range) and are skipped per ticker by callers.
//! Any other error kind aborts the run.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// Values indexed by year, then month.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySeries(BTreeMap<i32, BTreeMap<u32, f64>>);

impl MonthlySeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, year: i32, month: u32, value: f64) {
        self.0.entry(year).or_default().insert(month, value);
    }

    pub fn get(&self, year: i32, month: u32) -> Option<f64> {
        self.0.get(&year).and_then(|months| months.get(&month)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(BTreeMap::is_empty)
    }
}

#[async_trait]
pub trait FinancialDataProvider: Send + Sync {
    /// Standard deviation of analyst price targets per month within `[start, end]`.
    async fn target_price_std_dev(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError>;

    /// Mean analyst price target per month within `[start, end]`.
    async fn target_price_mean(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError>;

    /// Latest close price on or before `as_of`, looking back up to `lookback_days`
    /// business days for a trading day.
    async fn latest_close_price(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        lookback_days: u32,
    ) -> Result<f64, DomainError>;

    fn name(&self) -> &str;
}
