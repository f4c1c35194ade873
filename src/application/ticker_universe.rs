//! Ticker universe resolution.
//!
//! Universes come from a local file or from the data bucket. The bucket acts as
//! a shared copy of the bundled seed files: when an object is missing remotely
//! and a seed file with the same name exists, the seed is uploaded and used.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::export_cache::ExportCache;
use crate::domain::entities::ticker_universe::TickerUniverse;
use crate::domain::error::DomainError;
use crate::domain::ports::object_store::ObjectStore;

/// Name of the export holding the data bucket for an application namespace.
pub fn data_bucket_export_name(namespace: &str) -> String {
    format!("{namespace}-data-bucket-name")
}

/// Local directories and remote key prefix used for ticker files.
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Download destination, created on demand.
    pub data_dir: PathBuf,
    /// Read-only directory of bundled ticker files.
    pub seed_dir: PathBuf,
    /// Key prefix of ticker files inside the data bucket.
    pub remote_prefix: String,
}

pub struct TickerUniverseResolver {
    exports: Arc<ExportCache>,
    store: Arc<dyn ObjectStore>,
    layout: StorageLayout,
}

impl TickerUniverseResolver {
    pub fn new(exports: Arc<ExportCache>, store: Arc<dyn ObjectStore>, layout: StorageLayout) -> Self {
        Self {
            exports,
            store,
            layout,
        }
    }

    /// Read a newline-delimited ticker file at `path/filename`.
    pub fn from_local_file(path: &Path, filename: &str) -> Result<TickerUniverse, DomainError> {
        let file = path.join(filename);
        debug!(path = %file.display(), "reading ticker file");

        let text = fs::read_to_string(&file).map_err(|e| {
            DomainError::file_system(format!("Could not read ticker file {}", file.display()))
                .with_cause(e)
        })?;
        Ok(TickerUniverse::parse(&text))
    }

    /// Download `object_name` from the namespace's data bucket and parse it.
    pub fn from_remote(&self, object_name: &str, namespace: &str) -> Result<TickerUniverse, DomainError> {
        let export_name = data_bucket_export_name(namespace);
        debug!(export = %export_name, "reading data bucket location from exports");
        let bucket = self.exports.read_export_value(&export_name)?;

        let key = format!("{}/{}", self.layout.remote_prefix, object_name);

        fs::create_dir_all(&self.layout.data_dir).map_err(|e| {
            DomainError::file_system(format!(
                "Could not create data directory {}",
                self.layout.data_dir.display()
            ))
            .with_cause(e)
        })?;

        match self.download(&bucket, &key, object_name) {
            Ok(()) => Self::from_local_file(&self.layout.data_dir, object_name),
            Err(e) if e.resource_not_found() => self.repair(e, &bucket, &key, object_name),
            Err(e) => Err(e),
        }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Download into a uniquely named temp file, then move it into place so a failed
    /// transfer never leaves a truncated ticker file behind.
    fn download(&self, bucket: &str, key: &str, object_name: &str) -> Result<(), DomainError> {
        let dest = self.layout.data_dir.join(object_name);
        let partial = self
            .layout
            .data_dir
            .join(format!(".{object_name}.{}.part", Uuid::new_v4()));

        debug!(bucket, key, dest = %dest.display(), "downloading ticker file");
        if let Err(e) = self.store.download_object(bucket, key, &partial) {
            let _ = fs::remove_file(&partial);
            return Err(e);
        }

        fs::rename(&partial, &dest).map_err(|e| {
            let _ = fs::remove_file(&partial);
            DomainError::file_system(format!("Could not move download to {}", dest.display()))
                .with_cause(e)
        })
    }

    fn repair(
        &self,
        not_found: DomainError,
        bucket: &str,
        key: &str,
        object_name: &str,
    ) -> Result<TickerUniverse, DomainError> {
        debug!(bucket, key, "ticker file not found remotely, looking for a local seed");

        let seed = self.layout.seed_dir.join(object_name);
        if !seed.is_file() {
            warn!(seed = %seed.display(), "no local seed for missing ticker file");
            return Err(not_found);
        }

        info!(seed = %seed.display(), bucket, key, "uploading seed ticker file");
        self.store.upload_object(&seed, bucket, key)?;

        Self::from_local_file(&self.layout.seed_dir, object_name)
    }
}
