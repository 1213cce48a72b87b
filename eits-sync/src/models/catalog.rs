//! Catalog documents as served by the remote API
//!
//! Field names follow the wire format (`groupId`, `moduleTitle`,
//! `measureDetails`, ...). Lists the API sends as `null` deserialize as empty
//! lists; identifiers sent as `null` become empty strings. Text fields stay
//! optional so the normalizer can tell a missing value from an empty one.

use super::{non_null_items, null_as_default};
use serde::{Deserialize, Serialize};

/// Title/content pair used for module descriptions and module-level risks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Smallest actionable control item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Measure {
    #[serde(rename = "measureId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "measureTitle", default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    /// `null` entries are dropped
    #[serde(default, deserialize_with = "non_null_items")]
    pub assignees: Vec<String>,
    /// One-letter confidentiality/integrity/availability markers
    #[serde(rename = "securityCodes", default, deserialize_with = "null_as_default")]
    pub security_codes: Vec<String>,
    #[serde(rename = "measureCode", default)]
    pub code: Option<String>,
}

/// Tier-grouped measures of a module
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureGroup {
    #[serde(rename = "groupId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "groupTitle", default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub measures: Vec<Measure>,
    /// Tier code, e.g. "3.2"
    #[serde(rename = "groupCode", default)]
    pub code: Option<String>,
}

/// Module as it appears inside a catalog or diff tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(rename = "moduleId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "groupId", default)]
    pub group_id: Option<String>,
    #[serde(rename = "moduleTitle", default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "measureDetails", default, deserialize_with = "null_as_default")]
    pub measure_groups: Vec<MeasureGroup>,
    #[serde(rename = "moduleCode", default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Vec<ElementInfo>,
}

impl Module {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Node of the catalog tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "groupId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "groupTitle", default)]
    pub title: Option<String>,
    #[serde(rename = "parentGroupId", default)]
    pub parent_id: Option<String>,
    #[serde(rename = "moduleSubgroups", default, deserialize_with = "null_as_default")]
    pub subgroups: Vec<Group>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modules: Vec<Module>,
    #[serde(rename = "groupCode", default)]
    pub code: Option<String>,
}

impl Group {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.id)
    }
}

/// Full catalog for one version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_to: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "moduleGroups", default, deserialize_with = "null_as_default")]
    pub root_groups: Vec<Group>,
}

/// Old/new sides of a replaced subtree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacedGroup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub old_value: Group,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_value: Group,
}

/// Set difference between two catalog versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffCatalog {
    #[serde(default, deserialize_with = "null_as_default")]
    pub old_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub new_version: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub added: Vec<Group>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub removed: Vec<Group>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub replaced: Vec<ReplacedGroup>,
}

/// Raw module document returned by the per-module endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContent {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub valid_from: Option<String>,
    #[serde(default)]
    pub valid_to: Option<String>,
    #[serde(rename = "moduleId", default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "moduleTitle", default)]
    pub title: Option<String>,
    /// Expected entries: purpose, responsibility, limits
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: Vec<ElementInfo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub risks: Vec<ElementInfo>,
    #[serde(default)]
    pub additional_info: Option<String>,
    #[serde(rename = "measureDetails", default, deserialize_with = "null_as_default")]
    pub measure_groups: Vec<MeasureGroup>,
    #[serde(rename = "moduleCode", default)]
    pub code: Option<String>,
}
