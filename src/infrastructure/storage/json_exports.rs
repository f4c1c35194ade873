//! Export listing read from a JSON file.
//!
//! The file holds an array of export records:
//!
//! ```json
//! [
//!   {
//!     "name": "sa-test-data-bucket-name",
//!     "value": "sa-test-data-bucket",
//!     "exporting_stack_id": "arn:aws:cloudformation:us-east-1:123456789012:stack/app-infra-base/c9481160"
//!   }
//! ]
//! ```
//!
//! Records are served in fixed-size pages with the next offset as the token.

use std::fs;
use std::path::PathBuf;

use crate::domain::error::DomainError;
use crate::domain::ports::export_source::{ExportPage, ExportRecord, ExportSource};

const DEFAULT_PAGE_SIZE: usize = 50;

pub struct JsonExportSource {
    path: PathBuf,
    page_size: usize,
}

impl JsonExportSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    fn read_all(&self) -> Result<Vec<ExportRecord>, DomainError> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            DomainError::aws(format!("Could not read exports file {}", self.path.display()))
                .with_cause(e)
        })?;
        serde_json::from_str(&text).map_err(|e| {
            DomainError::aws(format!("Could not parse exports file {}", self.path.display()))
                .with_cause(e)
        })
    }
}

impl ExportSource for JsonExportSource {
    fn list_exports_page(&self, next_token: Option<&str>) -> Result<ExportPage, DomainError> {
        let offset = match next_token {
            Some(token) => token.parse::<usize>().map_err(|e| {
                DomainError::validation(format!("Invalid export page token: {token}")).with_cause(e)
            })?,
            None => 0,
        };

        let all = self.read_all()?;
        let end = (offset + self.page_size).min(all.len());
        let exports = all.get(offset..end).map(<[ExportRecord]>::to_vec).unwrap_or_default();
        let next_token = (end < all.len()).then(|| end.to_string());

        Ok(ExportPage {
            exports,
            next_token,
        })
    }
}
