use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::error::DomainError;
use crate::domain::ports::financial_data::{FinancialDataProvider, MonthlySeries};
use crate::domain::values::analysis_period::subtract_business_days;

pub const DEFAULT_BASE_URL: &str = "https://api-v2.intrinio.com";

const PAGE_SIZE: usize = 100;
/// Upper bound on followed `next_page` links for a single query.
const MAX_PAGES: usize = 20;

type ConsensusKey = (String, NaiveDate, NaiveDate);

/// Intrinio v2 REST client for analyst price targets and daily prices.
///
/// Target price mean and standard deviation come from the same consensus listing,
/// which is fetched once per (ticker, window) and shared by both series.
pub struct IntrinioProvider {
    client: Client,
    api_key: String,
    base_url: String,
    consensus: Mutex<HashMap<ConsensusKey, Arc<Vec<TargetPriceConsensus>>>>,
}

impl IntrinioProvider {
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            consensus: Mutex::new(HashMap::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TargetPriceConsensusPage {
    #[serde(default)]
    target_price_consensuses: Vec<TargetPriceConsensus>,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TargetPriceConsensus {
    date: NaiveDate,
    #[serde(default)]
    mean: Option<f64>,
    #[serde(default)]
    standard_deviation: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct StockPricePage {
    #[serde(default)]
    stock_prices: Vec<StockPrice>,
    next_page: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockPrice {
    date: NaiveDate,
    #[serde(default)]
    close: Option<f64>,
}

trait Paged {
    fn next_page(&self) -> Option<&str>;
}

impl Paged for TargetPriceConsensusPage {
    fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|p| !p.is_empty())
    }
}

impl Paged for StockPricePage {
    fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref().filter(|p| !p.is_empty())
    }
}

impl IntrinioProvider {
    async fn get_page<T: DeserializeOwned>(
        &self,
        ticker: &str,
        path: &str,
        query: &[(&str, String)],
        next_page: Option<&str>,
    ) -> Result<T, DomainError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .client
            .get(&url)
            .query(query)
            .query(&[("page_size", PAGE_SIZE.to_string()), ("api_key", self.api_key.clone())]);
        if let Some(page) = next_page {
            request = request.query(&[("next_page", page)]);
        }

        let resp = request.send().await.map_err(|e| {
            DomainError::data(format!("Could not reach Intrinio for {ticker}")).with_cause(e)
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DomainError::data(format!(
                "{ticker} is not covered by Intrinio ({path})"
            )));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DomainError::validation(format!(
                "Intrinio rejected the API key ({status})"
            )));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::data(format!(
                "Intrinio returned {status} for {ticker}: {body}"
            )));
        }

        resp.json::<T>().await.map_err(|e| {
            DomainError::data(format!("Could not parse Intrinio response for {ticker}")).with_cause(e)
        })
    }

    async fn get_all_pages<T: DeserializeOwned + Paged>(
        &self,
        ticker: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, DomainError> {
        let mut pages: Vec<T> = Vec::new();
        let mut next_page: Option<String> = None;

        for _ in 0..MAX_PAGES {
            let page: T = self.get_page(ticker, path, query, next_page.as_deref()).await?;
            next_page = page.next_page().map(String::from);
            pages.push(page);
            if next_page.is_none() {
                return Ok(pages);
            }
        }

        warn!(ticker, path, max_pages = MAX_PAGES, "Intrinio listing exceeds page limit");
        Err(DomainError::data(format!(
            "Intrinio returned more than {MAX_PAGES} pages for {ticker} ({path})"
        )))
    }

    async fn target_price_consensus(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Arc<Vec<TargetPriceConsensus>>, DomainError> {
        let key = (ticker.to_string(), start, end);
        if let Some(hit) = self.cached_consensus(&key) {
            debug!(ticker, %start, %end, "reusing target price consensus");
            return Ok(hit);
        }

        let consensus = Arc::new(self.fetch_consensus(ticker, start, end).await?);
        self.consensus
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, consensus.clone());
        Ok(consensus)
    }

    fn cached_consensus(&self, key: &ConsensusKey) -> Option<Arc<Vec<TargetPriceConsensus>>> {
        self.consensus
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    async fn fetch_consensus(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TargetPriceConsensus>, DomainError> {
        debug!(ticker, %start, %end, "fetching target price consensus");
        let query = [
            ("identifier", ticker.to_string()),
            ("start_date", start.to_string()),
            ("end_date", end.to_string()),
        ];
        let pages: Vec<TargetPriceConsensusPage> = self
            .get_all_pages(ticker, "/zacks/target_price_consensus", &query)
            .await?;

        let consensus: Vec<TargetPriceConsensus> = pages
            .into_iter()
            .flat_map(|p| p.target_price_consensuses)
            .filter(|c| c.date >= start && c.date <= end)
            .collect();

        if consensus.is_empty() {
            return Err(DomainError::data(format!(
                "No target price consensus for {ticker} between {start} and {end}"
            )));
        }
        Ok(consensus)
    }
}

/// Latest observation per calendar month.
fn monthly_latest(
    consensus: &[TargetPriceConsensus],
    value: impl Fn(&TargetPriceConsensus) -> Option<f64>,
) -> MonthlySeries {
    let mut observations: Vec<(NaiveDate, f64)> = consensus
        .iter()
        .filter_map(|c| value(c).map(|v| (c.date, v)))
        .collect();
    observations.sort_by_key(|(date, _)| *date);

    let mut series = MonthlySeries::new();
    for (date, v) in observations {
        series.insert(date.year(), date.month(), v);
    }
    series
}

#[async_trait]
impl FinancialDataProvider for IntrinioProvider {
    async fn target_price_std_dev(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError> {
        let consensus = self.target_price_consensus(ticker, start, end).await?;
        Ok(monthly_latest(&consensus, |c| c.standard_deviation))
    }

    async fn target_price_mean(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<MonthlySeries, DomainError> {
        let consensus = self.target_price_consensus(ticker, start, end).await?;
        Ok(monthly_latest(&consensus, |c| c.mean))
    }

    async fn latest_close_price(
        &self,
        ticker: &str,
        as_of: NaiveDate,
        lookback_days: u32,
    ) -> Result<f64, DomainError> {
        let start = subtract_business_days(as_of, lookback_days);
        debug!(ticker, %start, %as_of, "fetching close prices");

        let query = [
            ("start_date", start.to_string()),
            ("end_date", as_of.to_string()),
            ("frequency", "daily".to_string()),
        ];
        let path = format!("/securities/{ticker}/prices");
        let pages: Vec<StockPricePage> = self.get_all_pages(ticker, &path, &query).await?;

        pages
            .into_iter()
            .flat_map(|p| p.stock_prices)
            .filter(|p| p.date >= start && p.date <= as_of)
            .filter_map(|p| p.close.map(|close| (p.date, close)))
            .max_by_key(|(date, _)| *date)
            .map(|(_, close)| close)
            .ok_or_else(|| {
                DomainError::data(format!(
                    "No close price for {ticker} within {lookback_days} business days of {as_of}"
                ))
            })
    }

    fn name(&self) -> &str {
        "intrinio"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consensus(date: (i32, u32, u32), mean: f64, sd: Option<f64>) -> TargetPriceConsensus {
        TargetPriceConsensus {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            mean: Some(mean),
            standard_deviation: sd,
        }
    }

    #[test]
    fn test_monthly_latest_keeps_last_observation() {
        let data = vec![
            consensus((2020, 5, 20), 120.0, Some(4.0)),
            consensus((2020, 5, 2), 100.0, Some(9.0)),
            consensus((2020, 4, 28), 90.0, None),
        ];
        let means = monthly_latest(&data, |c| c.mean);
        assert_eq!(means.get(2020, 5), Some(120.0));
        assert_eq!(means.get(2020, 4), Some(90.0));

        let sds = monthly_latest(&data, |c| c.standard_deviation);
        assert_eq!(sds.get(2020, 5), Some(4.0));
        assert_eq!(sds.get(2020, 4), None);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let provider = IntrinioProvider::new("key".into(), Some("http://localhost:1234/".into()));
        assert_eq!(provider.base_url, "http://localhost:1234");
        assert_eq!(provider.name(), "intrinio");
    }
}
