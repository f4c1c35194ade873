//! Environment-driven configuration.

use std::path::PathBuf;

use crate::application::aggregator::DEFAULT_LOOKBACK_DAYS;
use crate::infrastructure::providers::intrinio::DEFAULT_BASE_URL;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Local download directory for ticker files.
    pub data_dir: PathBuf,
    /// Bundled ticker files used to repair the data bucket.
    pub seed_dir: PathBuf,
    /// Key prefix of ticker files in the data bucket.
    pub ticker_prefix: String,
    /// Stacks whose exports are visible to the application.
    pub stack_names: Vec<String>,
    pub app_namespace: String,
    pub object_store_root: PathBuf,
    pub exports_file: PathBuf,
    pub cache_db: String,
    pub intrinio_api_key: Option<String>,
    pub intrinio_base_url: String,
    pub lookback_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank values use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        Self {
            data_dir: or("RECOMMENDER_DATA_DIR", "./app_data").into(),
            seed_dir: or("RECOMMENDER_SEED_DIR", "./resources/ticker_files").into(),
            ticker_prefix: or("RECOMMENDER_TICKER_PREFIX", "ticker-files"),
            stack_names: or("RECOMMENDER_STACK_NAMES", "app-infra-base,app-infra-compute")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            app_namespace: or("RECOMMENDER_APP_NAMESPACE", "sa"),
            object_store_root: or("RECOMMENDER_OBJECT_STORE_ROOT", "./object_store").into(),
            exports_file: or("RECOMMENDER_EXPORTS_FILE", "./exports.json").into(),
            cache_db: or("RECOMMENDER_CACHE_DB", "./financial_cache.db"),
            intrinio_api_key: var("INTRINIO_API_KEY"),
            intrinio_base_url: or("INTRINIO_BASE_URL", DEFAULT_BASE_URL),
            lookback_days: var("RECOMMENDER_LOOKBACK_DAYS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LOOKBACK_DAYS),
        }
    }
}
