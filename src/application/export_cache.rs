//! Read-through cache of infrastructure exports.
//!
//! The full export listing is fetched once and kept for the lifetime of the
//! cache. The cache is not keyed by the stack filter: a process uses a single
//! filter set, so the first populated map answers every later call.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::ports::export_source::ExportSource;

/// Export name → export value.
pub type ExportMap = BTreeMap<String, String>;

pub struct ExportCache {
    source: Arc<dyn ExportSource>,
    stack_names: HashSet<String>,
    exports: Mutex<Option<ExportMap>>,
}

impl ExportCache {
    /// `stack_names` is the filter used by [`read_export_value`](Self::read_export_value).
    pub fn new(source: Arc<dyn ExportSource>, stack_names: Vec<String>) -> Self {
        Self {
            source,
            stack_names: stack_names.into_iter().collect(),
            exports: Mutex::new(None),
        }
    }

    /// Exports published by the stacks in `stack_name_filter`.
    ///
    /// The first call pages through the entire listing; the lock is held while
    /// doing so, so the listing happens at most once per cache.
    pub fn list_exports(&self, stack_name_filter: &HashSet<String>) -> Result<ExportMap, DomainError> {
        let mut cached = self.exports.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(exports) = cached.as_ref() {
            debug!("using cached exports");
            return Ok(exports.clone());
        }

        debug!("exports not cached, listing them");
        let exports = self.fetch_exports(stack_name_filter)?;
        *cached = Some(exports.clone());
        Ok(exports)
    }

    /// Value of a single export from the configured stacks.
    pub fn read_export_value(&self, export_name: &str) -> Result<String, DomainError> {
        let exports = self.list_exports(&self.stack_names)?;
        exports.get(export_name).cloned().ok_or_else(|| {
            DomainError::validation(format!(
                "{export_name} could not be found in cloudformation exports"
            ))
        })
    }

    pub fn stack_names(&self) -> &HashSet<String> {
        &self.stack_names
    }

    fn fetch_exports(&self, stack_name_filter: &HashSet<String>) -> Result<ExportMap, DomainError> {
        let mut exports = ExportMap::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .source
                .list_exports_page(next_token.as_deref())
                .map_err(|e| DomainError::aws("Could not list cloudformation exports").with_cause(e))?;

            for export in page.exports {
                let stack_name = stack_name_from_arn(&export.exporting_stack_id)?;
                if stack_name_filter.contains(stack_name) {
                    exports.insert(export.name, export.value);
                }
            }

            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        debug!(count = exports.len(), "exports loaded");
        Ok(exports)
    }
}

/// Stack name from a stack ARN.
///
/// `arn:aws:cloudformation:region:acct:stack/app-infra-base/c9481160-...` → `app-infra-base`
pub fn stack_name_from_arn(arn: &str) -> Result<&str, DomainError> {
    let stack_id = arn.split(':').nth(5).ok_or_else(|| {
        DomainError::validation("Could not parse stack ID from arn")
            .with_cause(format!("{arn} has fewer than 6 ':' separated fields"))
    })?;

    stack_id.split('/').nth(1).ok_or_else(|| {
        DomainError::validation("Could not parse stack ID from arn")
            .with_cause(format!("{stack_id} has no stack name segment"))
    })
}
