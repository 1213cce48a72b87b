//! Measure-to-risk lookup
//!
//! Risk tables map a normalized measure code to the ordered list of threat
//! codes it mitigates. Tables are versioned alongside the catalog and live on
//! disk as `risks_<version>.json`; a catalog version without a table simply
//! resolves nothing.

use crate::error::{SyncError, SyncResult};
use crate::models::RiskLookup;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Read-only measure code → risk codes mapping for one catalog version
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskTable {
    version: String,
    entries: HashMap<String, Vec<String>>,
}

impl RiskTable {
    pub fn new(version: impl Into<String>, entries: HashMap<String, Vec<String>>) -> Self {
        Self {
            version: version.into(),
            entries,
        }
    }

    /// Parse a JSON object of `{"MEASURE.CODE": ["G 0.1", ...]}`
    pub fn from_json_str(version: &str, json: &str) -> SyncResult<Self> {
        let entries: HashMap<String, Vec<String>> = serde_json::from_str(json)
            .map_err(|e| SyncError::decode(format!("risk table {}", version), e))?;
        Ok(Self::new(version, entries))
    }

    /// Load `risks_<version>.json` from `dir`
    ///
    /// A version without a table file yields `Ok(None)`.
    pub fn load_for_version(dir: &Path, version: &str) -> SyncResult<Option<Self>> {
        let path = dir.join(format!("risks_{}.json", version));
        if !path.exists() {
            tracing::info!(
                path = %path.display(),
                "No risk table for catalog version {}, measure risks will not be resolved",
                version
            );
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path)?;
        let table = Self::from_json_str(version, &json)?;
        tracing::info!(
            path = %path.display(),
            entries = table.len(),
            "Loaded risk table for catalog version {}",
            version
        );
        Ok(Some(table))
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw lookup
    pub fn resolve(&self, measure_code: &str) -> Option<&[String]> {
        self.entries.get(measure_code).map(Vec::as_slice)
    }
}

/// Resolves measure codes against the risk table selected for this run
#[derive(Debug, Clone, Default)]
pub struct RiskLinker {
    table: Option<Arc<RiskTable>>,
}

impl RiskLinker {
    pub fn new(table: Option<RiskTable>) -> Self {
        Self {
            table: table.map(Arc::new),
        }
    }

    /// Linker that never attempts a lookup
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }

    pub fn resolve(&self, measure_code: &str) -> RiskLookup {
        let Some(table) = &self.table else {
            return RiskLookup::NotAttempted;
        };

        match table.resolve(measure_code) {
            Some(codes) => {
                tracing::trace!(measure_code, risks = codes.len(), "Resolved measure risks");
                RiskLookup::Found(codes.to_vec())
            }
            None => {
                tracing::debug!(
                    "Measure {} doesn't have risks in risk table {}",
                    measure_code,
                    table.version()
                );
                RiskLookup::Missing
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(pairs: &[(&str, &[&str])]) -> RiskTable {
        let entries = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
            .collect();
        RiskTable::new("2023", entries)
    }

    #[test]
    fn test_found() {
        let linker = RiskLinker::new(Some(table(&[("M1", &["R1", "R2"])])));
        assert_eq!(
            linker.resolve("M1"),
            RiskLookup::Found(vec!["R1".to_string(), "R2".to_string()])
        );
    }

    #[test]
    fn test_missing_is_not_empty() {
        let linker = RiskLinker::new(Some(table(&[("M1", &["R1"])])));
        let lookup = linker.resolve("M2");
        assert_eq!(lookup, RiskLookup::Missing);
        assert_eq!(lookup.as_codes(), None);
    }

    #[test]
    fn test_empty_list_is_found() {
        let linker = RiskLinker::new(Some(table(&[("M1", &[])])));
        assert_eq!(linker.resolve("M1"), RiskLookup::Found(Vec::new()));
    }

    #[test]
    fn test_no_table() {
        let linker = RiskLinker::disabled();
        assert!(!linker.has_table());
        assert_eq!(linker.resolve("M1"), RiskLookup::NotAttempted);
    }

    #[test]
    fn test_load_for_version() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("risks_2023.json"),
            r#"{"ISMS.1.M1": ["G 0.18", "G 0.29"]}"#,
        )
        .unwrap();

        let loaded = RiskTable::load_for_version(dir.path(), "2023").unwrap().unwrap();
        assert_eq!(loaded.version(), "2023");
        assert_eq!(
            loaded.resolve("ISMS.1.M1"),
            Some(&["G 0.18".to_string(), "G 0.29".to_string()][..])
        );

        assert!(RiskTable::load_for_version(dir.path(), "2019").unwrap().is_none());
    }

    #[test]
    fn test_malformed_table_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("risks_2022.json"), "[1, 2").unwrap();

        let err = RiskTable::load_for_version(dir.path(), "2022").unwrap_err();
        assert!(matches!(err, SyncError::Decode { .. }));
    }
}
