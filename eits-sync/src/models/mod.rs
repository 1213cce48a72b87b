//! Data models for eits-sync
//!
//! - `catalog`: wire documents from the remote catalog API
//! - `normalized`: flat output records
//! - `tier`: measure-group tier enumeration
//! - `fetch_report`: per-run outcome of the module fetch phase

pub mod catalog;
pub mod fetch_report;
pub mod normalized;
pub mod tier;

pub use catalog::{
    Catalog, DiffCatalog, ElementInfo, Group, Measure, MeasureGroup, Module, ModuleContent,
    ReplacedGroup,
};
pub use fetch_report::{FetchReport, ModuleFailure};
pub use normalized::{MeasureRow, NormalizedMeasure, NormalizedModule, RiskDefinition, RiskLookup};
pub use tier::{tier_name, MeasureTier};

use serde::{Deserialize, Deserializer};

/// Deserialize `null` as `T::default()`
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a list of optional strings, dropping `null` entries
///
/// A `null` list becomes an empty one.
pub(crate) fn non_null_items<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Option<String>>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .flatten()
        .collect())
}
