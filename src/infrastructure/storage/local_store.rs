//! Filesystem-backed object store.
//!
//! Each bucket is a directory under `root`; object keys map to relative paths.
//! Useful for offline runs and tests where no remote store is reachable.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ports::object_store::ObjectStore;

pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Filesystem location of `bucket/key`.
    pub fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.join(bucket), |path, segment| path.join(segment))
    }
}

impl ObjectStore for LocalObjectStore {
    fn download_object(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), DomainError> {
        let source = self.object_path(bucket, key);
        debug!(source = %source.display(), dest = %dest.display(), "copying object");

        let message = || format!("Could not download s3://{bucket}/{key} --> {}", dest.display());

        if !source.is_file() {
            return Err(DomainError::aws_not_found(message()).with_cause(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} (404) Not Found", source.display()),
            )));
        }
        fs::copy(&source, dest).map_err(|e| DomainError::aws(message()).with_cause(e))?;
        Ok(())
    }

    fn upload_object(&self, source: &Path, bucket: &str, key: &str) -> Result<(), DomainError> {
        let target = self.object_path(bucket, key);
        let message = || format!("Could not upload {} --> s3://{bucket}/{key}", source.display());

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| DomainError::aws(message()).with_cause(e))?;
        }
        fs::copy(source, &target).map_err(|e| DomainError::aws(message()).with_cause(e))?;
        Ok(())
    }
}
