//! Error types for `issue-store`.
//!
//! Remote-write failures are surfaced through the mutation that caused them,
//! after the store has already rolled the entity back. Rank precision
//! exhaustion is recovered inside the order manager and never appears here.

use std::path::PathBuf;
use thiserror::Error;

use crate::remote::RemoteError;

/// Primary error type for issue store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    // === Lookup Errors ===
    /// Issue with the specified ID is not in the table.
    #[error("Issue not found: {id}")]
    IssueNotFound { id: String },

    /// Mutation id is unknown or was already resolved.
    #[error("Mutation not found: {id}")]
    MutationNotFound { id: u64 },

    // === Field Errors ===
    /// Unknown status name.
    #[error("Invalid status: {status}")]
    InvalidStatus { status: String },

    /// Priority out of valid range (0-4).
    #[error("Priority must be 0-4, got: {priority}")]
    InvalidPriority { priority: i32 },

    /// Unknown sort field name.
    #[error("Invalid sort field: {field}")]
    InvalidSortField { field: String },

    // === Remote Write Errors ===
    /// The backend rejected the payload. The optimistic change was rolled back.
    #[error("Rejected by server: {reason}")]
    ValidationRejected { reason: String },

    /// The backend was unreachable or did not answer in time.
    /// The optimistic change was rolled back; retrying is up to the caller.
    #[error("Network failure: {reason}")]
    NetworkFailure { reason: String },

    // === Snapshot Errors ===
    /// Failed to parse a line in a JSONL snapshot.
    #[error("JSONL parse error at line {line}: {reason}")]
    JsonlParse { line: usize, reason: String },

    /// Snapshot file not found at the specified path.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // === Configuration Errors ===
    /// Invalid store configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::IssueNotFound { id: id.into() }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::ValidationRejected {
            reason: reason.into(),
        }
    }

    /// True for failures that a caller-level retry may fix.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }
}

impl From<RemoteError> for StoreError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Rejected { reason } => Self::ValidationRejected { reason },
            RemoteError::Network { reason } => Self::NetworkFailure { reason },
            RemoteError::Timeout { after_ms } => Self::NetworkFailure {
                reason: format!("timed out after {after_ms}ms"),
            },
        }
    }
}

/// Result type using `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;
