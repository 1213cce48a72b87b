//! Measure tiers
//!
//! Measure groups carry a numeric code that maps onto one of three tiers.
//! Unknown codes are an open category: they map to no tier and an empty
//! name, never to an error.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureTier {
    /// "3.2"
    Base,
    /// "3.3"
    Standard,
    /// "3.4"
    High,
}

impl MeasureTier {
    /// Exact match on the group code, no trimming
    pub fn from_group_code(code: &str) -> Option<Self> {
        match code {
            "3.2" => Some(MeasureTier::Base),
            "3.3" => Some(MeasureTier::Standard),
            "3.4" => Some(MeasureTier::High),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MeasureTier::Base => "base",
            MeasureTier::Standard => "standard",
            MeasureTier::High => "high",
        }
    }
}

/// Human-readable tier name for a group code, "" when unknown
pub fn tier_name(code: &str) -> &'static str {
    let name = MeasureTier::from_group_code(code).map(MeasureTier::name).unwrap_or("");
    tracing::trace!(code, name, "Matched measure group tier");
    name
}
