//! Fetch phase results and per-module failures
//!
//! A run always completes with best-effort output. Modules that could not be
//! fetched or normalized are listed as failures next to the modules that made
//! it.

use super::normalized::NormalizedModule;
use crate::error::SyncError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Why and where a module was excluded from the output
#[derive(Debug, Clone, Serialize)]
pub struct ModuleFailure {
    pub module_id: String,
    pub module_title: String,
    /// Title of the root group the module was dispatched under
    pub root_group: String,
    /// Error code, e.g. "TIMEOUT", "TRANSPORT_ERROR"
    pub error_code: String,
    pub error_message: String,
    pub occurred_at: DateTime<Utc>,
}

impl ModuleFailure {
    pub fn new(module_id: &str, module_title: &str, root_group: &str, error: &SyncError) -> Self {
        Self {
            module_id: module_id.to_string(),
            module_title: module_title.to_string(),
            root_group: root_group.to_string(),
            error_code: error.code().to_string(),
            error_message: error.to_string(),
            occurred_at: Utc::now(),
        }
    }
}

/// Fetch phase completion result
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub catalog_version: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Modules in catalog flatten order, grouped by root group
    pub modules: Vec<NormalizedModule>,
    pub failures: Vec<ModuleFailure>,
}

impl FetchReport {
    pub fn new(catalog_version: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            catalog_version: catalog_version.into(),
            started_at: now,
            finished_at: now,
            modules: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Modules dispatched in this run
    pub fn attempted(&self) -> usize {
        self.modules.len() + self.failures.len()
    }

    /// Count failures carrying the given error code
    pub fn count_by_code(&self, code: &str) -> usize {
        self.failures.iter().filter(|f| f.error_code == code).count()
    }

    pub fn duration_seconds(&self) -> i64 {
        (self.finished_at - self.started_at).num_seconds()
    }
}
