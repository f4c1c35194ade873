//! Calendar month used as the analysis window of a strategy run.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use serde::Serialize;

use crate::domain::error::DomainError;

/// Earliest year accepted for an analysis month.
pub const MIN_ANALYSIS_YEAR: i32 = 2000;

/// A calendar month with its first and last day resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisPeriod {
    year: i32,
    month: u32,
    start: NaiveDate,
    end: NaiveDate,
}

impl AnalysisPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "Invalid month: {month}. Must be between 1 and 12"
            )));
        }
        if year < MIN_ANALYSIS_YEAR {
            return Err(DomainError::validation(format!(
                "Invalid year: {year}. Must be {MIN_ANALYSIS_YEAR} or later"
            )));
        }

        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| DomainError::validation(format!("Invalid date: {year}-{month}")))?;
        let next_month = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| DomainError::validation(format!("Invalid date: {year}-{month}")))?;

        Ok(Self {
            year,
            month,
            start,
            end: next_month - Duration::days(1),
        })
    }

    /// The month before the one containing `date`.
    pub fn previous_to(date: NaiveDate) -> Result<Self, DomainError> {
        let first = date.with_day(1).unwrap_or(date);
        let prev = first - Duration::days(1);
        Self::new(prev.year(), prev.month())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last calendar day of the month.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Last day with usable data: the month end, or `today` while the month is in progress.
    pub fn capped_end(&self, today: NaiveDate) -> NaiveDate {
        today.min(self.end)
    }

    /// Timestamp form of [`capped_end`](Self::capped_end).
    pub fn data_date(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let month_end = self.end.and_time(chrono::NaiveTime::MIN).and_utc();
        now.min(month_end)
    }
}

/// Walk back `days` business days (Saturday and Sunday skipped) from `date`.
pub fn subtract_business_days(date: NaiveDate, days: u32) -> NaiveDate {
    let mut current = date;
    let mut remaining = days;
    while remaining > 0 {
        current -= Duration::days(1);
        if !matches!(current.weekday(), Weekday::Sat | Weekday::Sun) {
            remaining -= 1;
        }
    }
    current
}
