//! Normalized output records
//!
//! Flat, denormalized records built once per fetch cycle. These are the
//! shapes handed to the JSON and CSV writers.

use super::catalog::ElementInfo;
use serde::{Serialize, Serializer};

/// Outcome of a risk table lookup for one measure
///
/// `Missing` and `NotAttempted` both serialize as `null`; in memory they stay
/// distinct so callers can tell "no risks" from "no table to ask".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskLookup {
    /// Risk codes linked to the measure
    Found(Vec<String>),
    /// The table has no entry for the measure code
    Missing,
    /// No risk table was available for this catalog version
    NotAttempted,
}

impl RiskLookup {
    pub fn as_codes(&self) -> Option<&[String]> {
        match self {
            RiskLookup::Found(codes) => Some(codes),
            RiskLookup::Missing | RiskLookup::NotAttempted => None,
        }
    }

    pub fn into_codes(self) -> Option<Vec<String>> {
        match self {
            RiskLookup::Found(codes) => Some(codes),
            RiskLookup::Missing | RiskLookup::NotAttempted => None,
        }
    }
}

impl Serialize for RiskLookup {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_codes().serialize(serializer)
    }
}

/// Normalized measure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedMeasure {
    pub code: String,
    pub title: String,
    /// Tier name ("base", "standard", "high" or "")
    pub group: String,
    pub description: String,
    /// Security markers joined without separator, e.g. "CIA"
    pub security_code: String,
    pub assignees: Vec<String>,
    pub module_code: String,
    pub risks: RiskLookup,
}

/// Normalized module with its measures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedModule {
    pub code: String,
    pub title: String,
    pub purpose: String,
    pub responsibility: String,
    pub limits: String,
    pub additional_info: String,
    /// Module-level threat references, passed through as served
    pub risks: Vec<ElementInfo>,
    pub measures: Vec<NormalizedMeasure>,
    pub catalog_version: Option<String>,
    pub valid_from: Option<String>,
    pub valid_to: Option<String>,
}

/// One tabular row per measure, module fields duplicated
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeasureRow {
    pub catalog_version: String,
    pub module_valid_from: String,
    pub module_valid_to: String,
    pub module_purpose: String,
    pub module_responsibility: String,
    pub module_limits: String,
    pub module_additional_info: String,
    pub module_code: String,
    pub module_title: String,
    pub measure_code: String,
    pub measure_title: String,
    pub measure_group: String,
    pub measure_body: String,
    pub measure_assignees: String,
    pub measure_security_codes: String,
}

impl MeasureRow {
    /// Flatten one module into rows, escaping newlines as the two characters `\n`
    pub fn from_module(module: &NormalizedModule) -> Vec<MeasureRow> {
        module
            .measures
            .iter()
            .map(|measure| MeasureRow {
                catalog_version: module.catalog_version.clone().unwrap_or_default(),
                module_valid_from: module.valid_from.clone().unwrap_or_default(),
                module_valid_to: module.valid_to.clone().unwrap_or_default(),
                module_purpose: escape_newlines(&module.purpose),
                module_responsibility: escape_newlines(&module.responsibility),
                module_limits: escape_newlines(&module.limits),
                module_additional_info: escape_newlines(&module.additional_info),
                module_code: module.code.clone(),
                module_title: module.title.clone(),
                measure_code: measure.code.clone(),
                measure_title: measure.title.clone(),
                measure_group: measure.group.clone(),
                measure_body: escape_newlines(&measure.description),
                measure_assignees: measure.assignees.join(", "),
                measure_security_codes: measure.security_code.clone(),
            })
            .collect()
    }
}

fn escape_newlines(text: &str) -> String {
    text.replace('\n', "\\n")
}

/// Entry of the remote threat catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskDefinition {
    pub code: String,
    pub title: String,
    /// "CODE: Title"
    pub combined_title: String,
    /// Raw markup describing the threat, newlines removed
    pub description: String,
}
