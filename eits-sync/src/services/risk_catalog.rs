//! Threat catalog parsing
//!
//! The materials endpoint serves a document tree; one child, "Alusohtude
//! kataloog", holds every threat as an HTML section:
//!
//! ```text
//! <h2>G 0.1\tTulekahju</h2>
//! <p>...</p>
//! <h2>G 0.2\tEbasoodsad kliimatingimused</h2>
//! ```

use super::markup::strip_markup;
use crate::error::{SyncError, SyncResult};
use crate::models::RiskDefinition;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Title of the materials entry holding the threat catalog
pub const THREAT_CATALOG_TITLE: &str = "Alusohtude kataloog";

static HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<h2\b[^>]*>(.*?)</h2\s*>").expect("heading pattern is valid"));

/// Locate the threat catalog markup inside a materials document
pub fn find_threat_catalog(materials: &Value) -> SyncResult<&str> {
    let children = materials
        .get(0)
        .and_then(|first| first.get("child_objects"))
        .and_then(Value::as_array)
        .ok_or_else(|| SyncError::decode("materials", "first document has no child_objects list"))?;

    let entry = children
        .iter()
        .find(|child| child.get("title").and_then(Value::as_str) == Some(THREAT_CATALOG_TITLE))
        .ok_or_else(|| {
            SyncError::decode("materials", format!("no '{}' entry", THREAT_CATALOG_TITLE))
        })?;

    entry
        .get("content")
        .and_then(Value::as_str)
        .ok_or_else(|| SyncError::decode("materials", "threat catalog entry has no content"))
}

/// Parse `<h2>CODE\tTitle</h2>` sections
///
/// The description of a section is its raw markup up to the next heading,
/// with newlines removed. Headings without a tab are skipped.
pub fn parse_risk_definitions(html: &str) -> Vec<RiskDefinition> {
    let headings: Vec<_> = HEADING.captures_iter(html).collect();
    let mut definitions = Vec::with_capacity(headings.len());

    for (i, caps) in headings.iter().enumerate() {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let heading = strip_markup(inner.as_str());

        let Some((code, title)) = heading.trim().split_once('\t') else {
            tracing::warn!("Skipping threat heading without code separator: '{}'", heading.trim());
            continue;
        };
        let code = code.trim();
        let title = title.split('\t').next().unwrap_or("").trim();

        let section_end = headings
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|next| next.start())
            .unwrap_or(html.len());
        let description = html[whole.end()..section_end].replace('\n', "");

        definitions.push(RiskDefinition {
            code: code.to_string(),
            title: title.to_string(),
            combined_title: format!("{}: {}", code, title),
            description: description.trim().to_string(),
        });
    }

    tracing::debug!(definitions = definitions.len(), "Parsed threat catalog");
    definitions
}
