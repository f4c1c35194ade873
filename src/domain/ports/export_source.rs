//! Infrastructure export listing port.
//!
//! Stacks publish named output values ("exports"), such as the name of the
//! data bucket. The listing is paginated; callers follow `next_token` until it
//! is `None`.

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// One published export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub name: String,
    pub value: String,
    /// ARN of the stack that publishes this export, e.g.
    /// `arn:aws:cloudformation:us-east-1:123456789012:stack/app-infra-base/c9481160`.
    pub exporting_stack_id: String,
}

/// A single page of the export listing.
#[derive(Debug, Clone, Default)]
pub struct ExportPage {
    pub exports: Vec<ExportRecord>,
    pub next_token: Option<String>,
}

pub trait ExportSource: Send + Sync {
    /// Fetch the page starting at `next_token` (`None` for the first page).
    fn list_exports_page(&self, next_token: Option<&str>) -> Result<ExportPage, DomainError>;
}
