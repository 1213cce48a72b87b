//! Error types for eits-sync
//!
//! Hard failures only. Expected, recoverable outcomes (missing risk entry,
//! unavailable diff, pattern mismatch, excluded module) are values, see
//! `RiskLookup`, `DiffOutcome`, `PatternMismatch` and `ModuleFailure`.

use std::time::Duration;
use thiserror::Error;

/// Synchronization error
#[derive(Debug, Error)]
pub enum SyncError {
    /// Remote source unreachable or returned a non-success status
    #[error("Transport failure for {target}: {message}")]
    Transport { target: String, message: String },

    /// A single request exceeded its time budget
    #[error("Timed out after {after:?} waiting for {target}")]
    Timeout { target: String, after: Duration },

    /// Response body could not be decoded into the expected document
    #[error("Could not decode {target}: {message}")]
    Decode { target: String, message: String },

    /// Cyclic or structurally invalid catalog tree
    #[error("Malformed catalog: {0}")]
    MalformedCatalog(String),

    /// Wrong input shape, e.g. a missing or non-string text field
    #[error("Invalid input for {field}: {detail}")]
    InvalidInput { field: String, detail: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// eits-common error
    #[error("Common error: {0}")]
    Common(#[from] eits_common::Error),
}

impl SyncError {
    pub fn transport(target: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Transport {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(target: impl Into<String>, message: impl ToString) -> Self {
        SyncError::Decode {
            target: target.into(),
            message: message.to_string(),
        }
    }

    pub fn invalid_input(field: impl Into<String>, detail: impl Into<String>) -> Self {
        SyncError::InvalidInput {
            field: field.into(),
            detail: detail.into(),
        }
    }

    /// Short machine-readable code used in run reports
    pub fn code(&self) -> &'static str {
        match self {
            SyncError::Transport { .. } => "TRANSPORT_ERROR",
            SyncError::Timeout { .. } => "TIMEOUT",
            SyncError::Decode { .. } => "DECODE_ERROR",
            SyncError::MalformedCatalog(_) => "MALFORMED_CATALOG",
            SyncError::InvalidInput { .. } => "INVALID_INPUT",
            SyncError::Io(_) => "IO_ERROR",
            SyncError::Common(_) => "COMMON_ERROR",
        }
    }
}

/// Result type for synchronization operations
pub type SyncResult<T> = Result<T, SyncError>;
