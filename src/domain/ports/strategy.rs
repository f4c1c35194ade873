//! Strategy port for portfolio generation.
//!
//! A strategy takes a ticker universe and an analysis month and produces a
//! [`Portfolio`] of recommended tickers.

use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::values::portfolio::Portfolio;

#[async_trait]
pub trait PortfolioStrategy: Send + Sync {
    /// Constant name stamped on generated portfolios.
    fn name(&self) -> &'static str;

    async fn generate_portfolio(&self) -> Result<Portfolio, DomainError>;
}
