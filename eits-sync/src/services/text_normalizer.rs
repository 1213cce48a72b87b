//! Code/title normalization and record building
//!
//! Turns raw module documents into `NormalizedModule` records:
//! - codes lose any trailing annotation after the first whitespace
//! - titles lose `[responsibility]` annotations and a trailing security
//!   parenthetical, and gain a `"CODE: "` separator
//! - text fields are reduced to plain text unless HTML output is requested
//!
//! Raw codes and titles are classified against the grammar registry first.
//! Mismatches are logged at debug level and never block output.

use super::markup::strip_markup;
use super::pattern_validator::{classify, PatternKind};
use super::risk_linker::RiskLinker;
use crate::catalog::MeasureRef;
use crate::error::{SyncError, SyncResult};
use crate::models::{
    tier_name, Measure, ModuleContent, NormalizedMeasure, NormalizedModule,
};
use once_cell::sync::Lazy;
use regex::Regex;

static SQUARE_BRACKETS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]+\]").expect("bracket pattern is valid"));

static SECURITY_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([CIA]+[-IA]*\)$").expect("security pattern is valid"));

/// Truncate a code at its first whitespace
pub fn fix_code(code: &str) -> &str {
    match code.find(char::is_whitespace) {
        Some(end) => {
            tracing::debug!("Fixing code '{}'", code);
            &code[..end]
        }
        None => code,
    }
}

/// Canonicalize a title to `"CODE: Title"`
///
/// Trailing security parentheticals are stripped while their own text
/// contains the hyphen-joined `security_codes`; an empty list strips them all.
pub fn fix_title(title: &str, code: &str, security_codes: &[String]) -> String {
    let mut clean = SQUARE_BRACKETS.replace_all(title, "").trim().to_string();

    let joined = security_codes.join("-").to_lowercase();
    while let Some(suffix) = SECURITY_SUFFIX.find(&clean) {
        if !suffix.as_str().to_lowercase().contains(&joined) {
            break;
        }
        tracing::debug!("Removing security code '{}' from '{}'", suffix.as_str(), clean);
        clean = clean[..suffix.start()].trim().to_string();
    }

    if clean.contains(&format!("{}: ", fix_code(code))) {
        return clean;
    }

    match clean.split_once(char::is_whitespace) {
        Some((first, _)) if first.ends_with(':') => clean,
        Some((first, rest)) => format!("{}: {}", first, rest),
        None if clean.ends_with(':') => format!("{} ", clean),
        None => format!("{}: ", clean),
    }
}

fn check_pattern(value: &str, kind: PatternKind) {
    match classify(value, kind) {
        Ok(_) => tracing::trace!("Valid pattern. String '{}' matches {} format.", value, kind),
        Err(mismatch) => tracing::debug!(category = ?mismatch.category(), "{}", mismatch),
    }
}

/// Builds normalized records from raw catalog documents
#[derive(Debug, Clone, Default)]
pub struct TextNormalizer {
    html: bool,
    risks: RiskLinker,
}

impl TextNormalizer {
    /// `html = true` keeps text fields verbatim instead of stripping markup
    pub fn new(html: bool, risks: RiskLinker) -> Self {
        Self { html, risks }
    }

    pub fn html(&self) -> bool {
        self.html
    }

    fn text(&self, field: &str, value: Option<&str>) -> SyncResult<String> {
        let value = value.ok_or_else(|| SyncError::invalid_input(field, "missing text field"))?;
        Ok(if self.html {
            value.to_string()
        } else {
            strip_markup(value)
        })
    }

    pub fn normalize_measure(
        &self,
        raw: &Measure,
        module_code: &str,
        group_code: &str,
    ) -> SyncResult<NormalizedMeasure> {
        let raw_code = raw
            .code
            .as_deref()
            .ok_or_else(|| SyncError::invalid_input("measureCode", "missing"))?;
        let raw_title = raw
            .title
            .as_deref()
            .ok_or_else(|| SyncError::invalid_input("measureTitle", "missing"))?;

        tracing::debug!("Creating measure record for '{}'", raw_title);
        check_pattern(raw_code, PatternKind::MeasureCodeRaw);
        check_pattern(raw_title, PatternKind::MeasureTitleRaw);

        let code = fix_code(raw_code);
        Ok(NormalizedMeasure {
            code: code.to_string(),
            title: fix_title(raw_title, raw_code, &raw.security_codes),
            group: tier_name(group_code).to_string(),
            description: self.text("body", raw.body.as_deref())?,
            security_code: raw.security_codes.concat(),
            assignees: raw.assignees.clone(),
            module_code: fix_code(module_code).to_string(),
            risks: self.risks.resolve(code),
        })
    }

    /// Normalize a measure found while walking a catalog tree
    pub fn normalize_measure_ref(&self, measure: &MeasureRef<'_>) -> SyncResult<NormalizedMeasure> {
        self.normalize_measure(measure.measure, measure.module_code(), measure.group_code())
    }

    pub fn normalize_module(&self, raw: &ModuleContent) -> SyncResult<NormalizedModule> {
        let raw_code = raw
            .code
            .as_deref()
            .ok_or_else(|| SyncError::invalid_input("moduleCode", "missing"))?;
        let raw_title = raw
            .title
            .as_deref()
            .ok_or_else(|| SyncError::invalid_input("moduleTitle", "missing"))?;

        if raw.description.len() < 3 {
            return Err(SyncError::invalid_input(
                "description",
                format!(
                    "expected purpose, responsibility and limits, got {} entries",
                    raw.description.len()
                ),
            ));
        }

        let mut measures = Vec::new();
        for group in &raw.measure_groups {
            tracing::debug!(
                "Creating measure records for measure group '{}' in module '{}'",
                group.title.as_deref().unwrap_or(&group.id),
                raw_title
            );
            let group_code = group.code.as_deref().unwrap_or("");
            for measure in &group.measures {
                measures.push(self.normalize_measure(measure, raw_code, group_code)?);
            }
        }

        tracing::debug!("Creating module record for '{}'", raw_title);
        check_pattern(raw_code, PatternKind::ModuleCodeRaw);
        check_pattern(raw_title, PatternKind::ModuleTitleRaw);

        Ok(NormalizedModule {
            code: fix_code(raw_code).to_string(),
            title: fix_title(raw_title, raw_code, &[]),
            purpose: self.text("description[0]", raw.description[0].content.as_deref())?,
            responsibility: self.text("description[1]", raw.description[1].content.as_deref())?,
            limits: self.text("description[2]", raw.description[2].content.as_deref())?,
            additional_info: self.text("additionalInfo", raw.additional_info.as_deref())?,
            risks: raw.risks.clone(),
            measures,
            catalog_version: raw.version.clone(),
            valid_from: raw.valid_from.clone(),
            valid_to: raw.valid_to.clone(),
        })
    }
}
