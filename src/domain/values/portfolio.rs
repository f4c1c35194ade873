//! Recommended portfolio produced by a strategy run.
//!
//! Serializes to the published document shape:
//!
//! ```json
//! {
//!   "strategy_name": "LOW_PRICE_DISPERSION",
//!   "creation_time": "2020-06-01T14:03:11Z",
//!   "data_date": "2020-05-31T00:00:00Z",
//!   "portfolio": ["AAPL", "MSFT"]
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, named and dated list of selected tickers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    strategy_name: String,
    creation_time: DateTime<Utc>,
    data_date: DateTime<Utc>,
    portfolio: Vec<String>,
}

impl Portfolio {
    pub fn new(
        creation_time: DateTime<Utc>,
        data_date: DateTime<Utc>,
        strategy_name: impl Into<String>,
        tickers: Vec<String>,
    ) -> Self {
        Self {
            strategy_name: strategy_name.into(),
            creation_time,
            data_date,
            portfolio: tickers,
        }
    }

    pub fn strategy_name(&self) -> &str {
        &self.strategy_name
    }

    pub fn creation_time(&self) -> DateTime<Utc> {
        self.creation_time
    }

    /// End of the analysis window the selection was computed from.
    pub fn data_date(&self) -> DateTime<Utc> {
        self.data_date
    }

    /// Selected tickers, best ranked first.
    pub fn tickers(&self) -> &[String] {
        &self.portfolio
    }

    pub fn len(&self) -> usize {
        self.portfolio.len()
    }

    pub fn is_empty(&self) -> bool {
        self.portfolio.is_empty()
    }
}
