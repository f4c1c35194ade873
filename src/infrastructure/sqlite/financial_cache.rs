//! SQLite read-through cache for financial data.
//!
//! Historical targets and prices do not change once published, so provider
//! responses are stored by call and arguments and served locally afterwards.
//! Lookups whose window reaches today are still moving and always go to the
//! provider. Failed lookups are never cached.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::ports::financial_data::{FinancialDataProvider, MonthlySeries};

use super::migrations::run_migrations;

pub struct SqliteFinancialCache {
    conn: Mutex<Connection>,
}

impl SqliteFinancialCache {
    /// Open (or create) the cache database. `:memory:` gives a private in-memory cache.
    pub fn open(db_path: &str) -> Result<Self, DomainError> {
        let conn = Connection::open(db_path).map_err(|e| {
            DomainError::file_system(format!("Could not open financial cache {db_path}")).with_cause(e)
        })?;
        Self::new(conn)
    }

    pub fn new(conn: Connection) -> Result<Self, DomainError> {
        run_migrations(&conn).map_err(DomainError::file_system)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::file_system(e.to_string()))?;
        conn.query_row(
            "SELECT payload FROM financial_cache WHERE cache_key = ?1",
            params![key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| DomainError::file_system("Financial cache read failed").with_cause(e))
    }

    pub fn put(&self, key: &str, payload: &str) -> Result<(), DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::file_system(e.to_string()))?;
        conn.execute(
            "INSERT OR REPLACE INTO financial_cache (cache_key, payload, created_at) VALUES (?1, ?2, ?3)",
            params![key, payload, chrono::Utc::now().to_rfc3339()],
        )
        .map_err(|e| DomainError::file_system("Financial cache write failed").with_cause(e))?;
        Ok(())
    }

    pub fn len(&self) -> Result<usize, DomainError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| DomainError::file_system(e.to_string()))?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM financial_cache", [], |row| row.get(0))
            .map_err(|e| DomainError::file_system("Financial cache read failed").with_cause(e))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.len()? == 0)
    }
}

/// Wraps a provider with [`SqliteFinancialCache`].
pub struct CachedFinancialDataProvider {
    inner: Arc<dyn FinancialDataProvider>,
    cache: Arc<SqliteFinancialCache>,
    today: Option<NaiveDate>,
}

impl CachedFinancialDataProvider {
    pub fn new(inner: Arc<dyn FinancialDataProvider>, cache: Arc<SqliteFinancialCache>) -> Self {
        Self {
            inner,
            cache,
            today: None,
        }
    }

    /// Fix the date used to decide whether a window is settled; wall clock otherwise.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Data for windows ending before today is final.
    fn settled(&self, last_day: NaiveDate) -> bool {
        last_day < self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn key(&self, call: &str, ticker: &str, args: &[String]) -> String {
        format!("{}:{}:{}:{}", self.inner.name(), call, ticker, args.join(":"))
    }

    fn cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DomainError> {
        let Some(payload) = self.cache.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&payload) {
            Ok(value) => {
                debug!(key, "financial cache hit");
                Ok(Some(value))
            }
            Err(e) => {
                warn!(key, error = %e, "discarding unreadable financial cache entry");
                Ok(None)
            }
        }
    }

    fn store<T: Serialize>(&self, key: &str, value: &T) -> Result<(), DomainError> {
        let payload = serde_json::to_string(value).map_err(|e| {
            DomainError::file_system("Could not serialize financial cache entry").with_cause(e)
        })?;
        self.cache.put(key, &payload)
    }
}

#[async_trait]
impl FinancialDataProvider for CachedFinancialDataProvider {
    async fn target_price_std_dev(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError> {
        if !self.settled(end) {
            return self.inner.target_price_std_dev(ticker, start, end).await;
        }
        let key = self.key("target_price_std_dev", ticker, &[start.to_string(), end.to_string()]);
        if let Some(series) = self.cached(&key)? {
            return Ok(series);
        }
        let series = self.inner.target_price_std_dev(ticker, start, end).await?;
        self.store(&key, &series)?;
        Ok(series)
    }

    async fn target_price_mean(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError> {
        if !self.settled(end) {
            return self.inner.target_price_mean(ticker, start, end).await;
        }
        let key = self.key("target_price_mean", ticker, &[start.to_string(), end.to_string()]);
        if let Some(series) = self.cached(&key)? {
            return Ok(series);
        }
        let series = self.inner.target_price_mean(ticker, start, end).await?;
        self.store(&key, &series)?;
        Ok(series)
    }

    async fn latest_close_price(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        lookback_days: u32,
    ) -> Result<f64, DomainError> {
        if !self.settled(as_of) {
            return self.inner.latest_close_price(ticker, as_of, lookback_days).await;
        }
        let key = self.key(
            "latest_close_price",
            ticker,
            &[as_of.to_string(), lookback_days.to_string()],
        );
        if let Some(price) = self.cached(&key)? {
            return Ok(price);
        }
        let price = self.inner.latest_close_price(ticker, as_of, lookback_days).await?;
        self.store(&key, &price)?;
        Ok(price)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
