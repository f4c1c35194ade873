//! Input validation for recommendation runs.

use chrono::NaiveDate;

use crate::domain::error::DomainError;
use crate::domain::values::analysis_period::AnalysisPeriod;
use crate::domain::values::environment::Environment;

pub fn validate_environment(environment: &str) -> Result<Environment, DomainError> {
    environment.parse().map_err(|e: String| {
        DomainError::validation(format!(
            "Invalid environment '{environment}'. Must be one of: TEST, PRODUCTION"
        ))
        .with_cause(e)
    })
}

/// Parse a price date written as `YYYY/MM/DD` or `YYYY-MM-DD`.
pub fn validate_price_date(price_date: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(price_date, "%Y/%m/%d")
        .or_else(|_| NaiveDate::parse_from_str(price_date, "%Y-%m-%d"))
        .map_err(|e| {
            DomainError::validation(format!(
                "Invalid price date '{price_date}'. Use YYYY/MM/DD or YYYY-MM-DD"
            ))
            .with_cause(e)
        })
}

/// Check an explicit analysis month against the price date.
///
/// The month must be complete before the price date, otherwise the "actual"
/// return would be measured against data from inside the analysis window.
pub fn validate_commandline_parameters(
    year: i32,
    month: u32,
    price_date: NaiveDate,
) -> Result<AnalysisPeriod, DomainError> {
    let period = AnalysisPeriod::new(year, month)?;
    if period.end() >= price_date {
        return Err(DomainError::validation(format!(
            "Analysis period {year}-{month:02} must end before the price date {price_date}"
        )));
    }
    Ok(period)
}

/// Default analysis month for a price date: the month before it.
pub fn compute_analysis_period(price_date: NaiveDate) -> Result<AnalysisPeriod, DomainError> {
    AnalysisPeriod::previous_to(price_date)
}
