//! Synchronization services
//!
//! Leaf-first: grammars and markup, then normalization and risk lookup, then
//! the orchestrating services that talk to a `CatalogSource`.

pub mod catalog_client;
pub mod diff_reconciler;
pub mod fetch_orchestrator;
pub mod markup;
pub mod pattern_validator;
pub mod risk_catalog;
pub mod risk_linker;
pub mod text_normalizer;

pub use catalog_client::{CatalogSource, HttpCatalogSource};
pub use diff_reconciler::{DiffOutcome, DiffReconciler, DiffReport};
pub use fetch_orchestrator::{FetchOptions, FetchOrchestrator};
pub use markup::{strip_markup, strip_markup_value};
pub use pattern_validator::{classify, PatternCategory, PatternKind, PatternMatch, PatternMismatch};
pub use risk_catalog::parse_risk_definitions;
pub use risk_linker::{RiskLinker, RiskTable};
pub use text_normalizer::{fix_code, fix_title, TextNormalizer};
