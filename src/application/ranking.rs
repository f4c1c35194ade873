//! Ranking of loaded tickers by analyst agreement.
//!
//! Rows are binned into dispersion deciles (lowest dispersion first) and,
//! within a decile, ordered by the analysts' expected return, highest first.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::entities::financial_row::{RawFinancialRow, RawFinancialTable};
use crate::domain::values::decile::{quantile_bins, DECILES};

/// A loaded row together with its dispersion decile.
#[derive(Debug, Clone, Serialize)]
pub struct RankedRow {
    pub decile: usize,
    #[serde(flatten)]
    pub row: RawFinancialRow,
}

/// Every row of `table` in ranking order.
pub fn rank(table: &RawFinancialTable) -> Vec<RankedRow> {
    let dispersion: Vec<f64> = table
        .rows()
        .iter()
        .map(|r| r.target_price_stdev_pct)
        .collect();
    let deciles = quantile_bins(&dispersion, DECILES);

    let mut ranked: Vec<RankedRow> = table
        .rows()
        .iter()
        .cloned()
        .zip(deciles)
        .map(|(row, decile)| RankedRow { decile, row })
        .collect();

    // stable: equal keys keep table order
    ranked.sort_by(|a, b| {
        a.decile.cmp(&b.decile).then_with(|| {
            b.row
                .analyst_expected_return
                .partial_cmp(&a.row.analyst_expected_return)
                .unwrap_or(Ordering::Equal)
        })
    });
    ranked
}

/// Tickers of the top `portfolio_size` ranked rows (all rows if the table is smaller).
pub fn select(table: &RawFinancialTable, portfolio_size: usize) -> Vec<String> {
    rank(table)
        .into_iter()
        .take(portfolio_size)
        .map(|r| r.row.ticker)
        .collect()
}
