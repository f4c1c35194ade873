//! Shared test doubles for the ports.

#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use recommender::domain::error::DomainError;
use recommender::domain::ports::export_source::{ExportPage, ExportRecord, ExportSource};
use recommender::domain::ports::financial_data::{FinancialDataProvider, MonthlySeries};
use recommender::domain::ports::object_store::ObjectStore;

pub fn stack_arn(stack: &str) -> String {
    format!("arn:aws:cloudformation:us-east-1:123456789012:stack/{stack}/c9481160-6df5-11ea-ac9f-121b58656156")
}

pub fn export(name: &str, value: &str, stack: &str) -> ExportRecord {
    ExportRecord {
        name: name.to_string(),
        value: value.to_string(),
        exporting_stack_id: stack_arn(stack),
    }
}

// ── Exports ──────────────────────────────────────────────────────────────

/// Serves fixed pages and counts complete listing passes.
pub struct FakeExportSource {
    pages: Vec<Vec<ExportRecord>>,
    fail: bool,
    pub passes: AtomicUsize,
    pub page_calls: AtomicUsize,
}

impl FakeExportSource {
    pub fn new(pages: Vec<Vec<ExportRecord>>) -> Self {
        Self {
            pages,
            fail: false,
            passes: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
        }
    }

    pub fn single(exports: Vec<ExportRecord>) -> Self {
        Self::new(vec![exports])
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(vec![])
        }
    }

    pub fn passes(&self) -> usize {
        self.passes.load(Ordering::SeqCst)
    }
}

impl ExportSource for FakeExportSource {
    fn list_exports_page(&self, next_token: Option<&str>) -> Result<ExportPage, DomainError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(DomainError::aws("ExpiredToken: the security token has expired"));
        }

        let index: usize = next_token.map(|t| t.parse().unwrap()).unwrap_or(0);
        if index == 0 {
            self.passes.fetch_add(1, Ordering::SeqCst);
        }

        let exports = self.pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
        Ok(ExportPage {
            exports,
            next_token,
        })
    }
}

// ── Object store ─────────────────────────────────────────────────────────

/// In-memory object store keyed by `bucket/key`.
#[derive(Default)]
pub struct FakeObjectStore {
    objects: Mutex<HashMap<String, String>>,
    /// When set, downloads fail with a non-classified remote error.
    broken: bool,
    pub uploads: Mutex<Vec<String>>,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    pub fn with_object(self, bucket: &str, key: &str, contents: &str) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), contents.to_string());
        self
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(&format!("{bucket}/{key}"))
            .cloned()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

impl ObjectStore for FakeObjectStore {
    fn download_object(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), DomainError> {
        if self.broken {
            return Err(DomainError::aws(format!("Could not download s3://{bucket}/{key}"))
                .with_cause("(403) Forbidden"));
        }
        let contents = self.object(bucket, key).ok_or_else(|| {
            DomainError::aws_not_found(format!("Could not download s3://{bucket}/{key}"))
                .with_cause("An error occurred (404) when calling the HeadObject operation: Not Found")
        })?;
        fs::write(dest, contents).map_err(|e| DomainError::file_system("write failed").with_cause(e))
    }

    fn upload_object(&self, source: &Path, bucket: &str, key: &str) -> Result<(), DomainError> {
        let contents = fs::read_to_string(source)
            .map_err(|e| DomainError::aws("upload failed").with_cause(e))?;
        self.objects
            .lock()
            .unwrap()
            .insert(format!("{bucket}/{key}"), contents);
        self.uploads.lock().unwrap().push(format!("{bucket}/{key}"));
        Ok(())
    }
}

// ── Financial data ───────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum TickerBehavior {
    Data {
        stdev: f64,
        mean: f64,
        analysis_price: f64,
        current_price: f64,
    },
    /// Provider reports the ticker as not covered.
    NotCovered,
    /// Provider fails with a non-data error.
    Broken,
    /// Targets exist but not for the analysis month.
    WrongMonth,
}

/// Provider returning canned data for one analysis month.
pub struct FakeProvider {
    year: i32,
    month: u32,
    tickers: HashMap<String, TickerBehavior>,
    pub calls: AtomicUsize,
    pub requested_ranges: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
    pub price_dates: Mutex<Vec<(String, NaiveDate)>>,
}

impl FakeProvider {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            tickers: HashMap::new(),
            calls: AtomicUsize::new(0),
            requested_ranges: Mutex::new(Vec::new()),
            price_dates: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, ticker: &str, behavior: TickerBehavior) -> Self {
        self.tickers.insert(ticker.to_string(), behavior);
        self
    }

    /// Ticker with the given dispersion % and expected return from an analysis price of 100.
    pub fn with_ticker(self, ticker: &str, stdev_pct: f64, expected_return: f64) -> Self {
        let mean = 100.0 * (1.0 + expected_return);
        self.with(
            ticker,
            TickerBehavior::Data {
                stdev: stdev_pct * mean / 100.0,
                mean,
                analysis_price: 100.0,
                current_price: 105.0,
            },
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn behavior(&self, ticker: &str) -> Result<TickerBehavior, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.tickers.get(ticker) {
            None | Some(TickerBehavior::NotCovered) => {
                Err(DomainError::data(format!("{ticker} is not covered")))
            }
            Some(TickerBehavior::Broken) => Err(DomainError::validation("provider misconfigured")),
            Some(other) => Ok(other.clone()),
        }
    }

    fn series(&self, behavior: &TickerBehavior, pick: impl Fn(f64, f64) -> f64) -> MonthlySeries {
        let mut series = MonthlySeries::new();
        match behavior {
            TickerBehavior::Data { stdev, mean, .. } => {
                series.insert(self.year, self.month, pick(*stdev, *mean))
            }
            TickerBehavior::WrongMonth => series.insert(self.year - 1, self.month, 1.0),
            _ => {}
        }
        series
    }
}

#[async_trait]
impl FinancialDataProvider for FakeProvider {
    async fn target_price_std_dev(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError> {
        self.requested_ranges
            .lock()
            .unwrap()
            .push((ticker.to_string(), start, end));
        let behavior = self.behavior(ticker)?;
        Ok(self.series(&behavior, |stdev, _| stdev))
    }

    async fn target_price_mean(
        &self,
        ticker: &str,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError> {
        let behavior = self.behavior(ticker)?;
        Ok(self.series(&behavior, |_, mean| mean))
    }

    async fn latest_close_price(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        _lookback_days: u32,
    ) -> Result<f64, DomainError> {
        self.price_dates
            .lock()
            .unwrap()
            .push((ticker.to_string(), as_of));
        let behavior = self.behavior(ticker)?;
        match behavior {
            TickerBehavior::Data {
                analysis_price,
                current_price,
                ..
            } => {
                // the first price lookup per ticker is the analysis date
                let lookups = self
                    .price_dates
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|(t, _)| t == ticker)
                    .count();
                Ok(if lookups % 2 == 1 {
                    analysis_price
                } else {
                    current_price
                })
            }
            _ => Err(DomainError::data(format!("no prices for {ticker}"))),
        }
    }

    fn name(&self) -> &str {
        "fake"
    }
}

pub fn tickers(symbols: &[&str]) -> Vec<String> {
    symbols.iter().map(|s| s.to_string()).collect()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
