//! # EITS Common Library
//!
//! Shared code for the EITS catalog tools:
//! - Error types
//! - TOML configuration loading and root folder resolution
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
