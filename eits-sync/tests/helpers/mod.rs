//! Test Helper Utilities
//!
//! Shared fixtures for eits-sync integration tests

#![allow(dead_code)]

pub mod fixtures;
pub mod log_capture;
pub mod mock_source;

pub use fixtures::{catalog, group, module_content, module_ref};
pub use log_capture::LogCapture;
pub use mock_source::{MockBehavior, MockSource};
