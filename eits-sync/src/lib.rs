//! eits-sync library interface
//!
//! Synchronizes the E-ITS security catalog: fetches the catalog tree and every
//! module with bounded concurrency, normalizes codes and titles, links measure
//! risks and reconciles version diffs.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod services;

pub use crate::error::{SyncError, SyncResult};
