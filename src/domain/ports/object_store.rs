use std::path::Path;

use crate::domain::error::DomainError;

/// Remote object storage.
///
/// Implementations report failures as [`DomainError::Aws`]; a missing object must be
/// classified so that [`DomainError::resource_not_found`] returns true.
pub trait ObjectStore: Send + Sync {
    /// Download `bucket/key` to the local file `dest`.
    fn download_object(&self, bucket: &str, key: &str, dest: &Path) -> Result<(), DomainError>;

    /// Upload the local file `source` to `bucket/key`.
    fn upload_object(&self, source: &Path, bucket: &str, key: &str) -> Result<(), DomainError>;
}
