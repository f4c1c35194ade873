pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

use crate::application::export_cache::{ExportCache, ExportMap};
use crate::application::strategies::low_price_dispersion::{
    LowPriceDispersionStrategy, StrategyOutcome,
};
use crate::application::ticker_universe::{StorageLayout, TickerUniverseResolver};
use crate::config::AppConfig;
use crate::domain::entities::ticker_universe::TickerUniverse;
use crate::domain::error::DomainError;
use crate::domain::ports::export_source::ExportSource;
use crate::domain::ports::financial_data::FinancialDataProvider;
use crate::domain::ports::object_store::ObjectStore;
use crate::domain::values::analysis_period::AnalysisPeriod;
use crate::domain::values::environment::Environment;
use crate::infrastructure::providers::intrinio::IntrinioProvider;
use crate::infrastructure::sqlite::financial_cache::{
    CachedFinancialDataProvider, SqliteFinancialCache,
};
use crate::infrastructure::storage::json_exports::JsonExportSource;
use crate::infrastructure::storage::local_store::LocalObjectStore;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a ticker universe is read from.
#[derive(Debug, Clone)]
pub enum UniverseSource {
    /// A file in a local directory.
    Local(PathBuf),
    /// The environment's data bucket, repaired from the seed directory if missing.
    Remote,
}

/// Parameters of a portfolio generation run.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub ticker_file: String,
    pub source: UniverseSource,
    pub environment: Environment,
    pub period: AnalysisPeriod,
    /// Date current prices are evaluated at; wall clock when `None`.
    pub today: Option<DateTime<Utc>>,
    pub portfolio_size: usize,
}

pub struct Recommender {
    config: AppConfig,
    exports: Arc<ExportCache>,
    resolver: TickerUniverseResolver,
    provider: Option<Arc<dyn FinancialDataProvider>>,
}

impl Recommender {
    /// Wire the file-backed exports and object store, and the cached Intrinio provider
    /// when an API key is configured.
    pub fn new(config: AppConfig) -> Result<Self, DomainError> {
        let export_source: Arc<dyn ExportSource> =
            Arc::new(JsonExportSource::new(config.exports_file.clone()));
        let store: Arc<dyn ObjectStore> =
            Arc::new(LocalObjectStore::new(config.object_store_root.clone()));

        let provider: Option<Arc<dyn FinancialDataProvider>> = match &config.intrinio_api_key {
            Some(api_key) => {
                let intrinio = Arc::new(IntrinioProvider::new(
                    api_key.clone(),
                    Some(config.intrinio_base_url.clone()),
                ));
                let cache = Arc::new(SqliteFinancialCache::open(&config.cache_db)?);
                let cached: Arc<dyn FinancialDataProvider> =
                    Arc::new(CachedFinancialDataProvider::new(intrinio, cache));
                Some(cached)
            }
            None => None,
        };

        Ok(Self::build(config, export_source, store, provider))
    }

    pub fn with_providers(
        config: AppConfig,
        export_source: Arc<dyn ExportSource>,
        store: Arc<dyn ObjectStore>,
        provider: Arc<dyn FinancialDataProvider>,
    ) -> Self {
        Self::build(config, export_source, store, Some(provider))
    }

    fn build(
        config: AppConfig,
        export_source: Arc<dyn ExportSource>,
        store: Arc<dyn ObjectStore>,
        provider: Option<Arc<dyn FinancialDataProvider>>,
    ) -> Self {
        let exports = Arc::new(ExportCache::new(export_source, config.stack_names.clone()));
        let layout = StorageLayout {
            data_dir: config.data_dir.clone(),
            seed_dir: config.seed_dir.clone(),
            remote_prefix: config.ticker_prefix.clone(),
        };
        let resolver = TickerUniverseResolver::new(exports.clone(), store, layout);

        Self {
            config,
            exports,
            resolver,
            provider,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Exports of the configured stacks.
    pub fn list_exports(&self) -> Result<ExportMap, DomainError> {
        self.exports.list_exports(self.exports.stack_names())
    }

    pub fn load_universe(
        &self,
        ticker_file: &str,
        source: &UniverseSource,
        environment: Environment,
    ) -> Result<TickerUniverse, DomainError> {
        match source {
            UniverseSource::Local(dir) => TickerUniverseResolver::from_local_file(dir, ticker_file),
            UniverseSource::Remote => {
                let namespace = environment.qualify(&self.config.app_namespace);
                self.resolver.from_remote(ticker_file, &namespace)
            }
        }
    }

    pub async fn generate(&self, request: &GenerateRequest) -> Result<StrategyOutcome, DomainError> {
        let provider = self.provider.clone().ok_or_else(|| {
            DomainError::validation("INTRINIO_API_KEY is not set; no financial data provider")
        })?;

        let universe = self.load_universe(&request.ticker_file, &request.source, request.environment)?;

        let mut strategy = LowPriceDispersionStrategy::new(
            universe.into_tickers(),
            request.period.year(),
            request.period.month(),
            request.portfolio_size,
            provider,
        )?
        .with_lookback_days(self.config.lookback_days);
        if let Some(today) = request.today {
            strategy = strategy.with_today(today);
        }

        strategy.run().await
    }
}
