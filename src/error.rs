//! Error types for the `ib` command layer.

use std::path::PathBuf;
use thiserror::Error;

use issue_store::StoreError;

/// Primary error type for CLI commands.
#[derive(Error, Debug)]
pub enum AppError {
    // === Workspace Errors ===
    /// No `.issueboard/` directory in the working directory.
    #[error("Not initialized: run `ib init` first (looked for {path})")]
    NotInitialized { path: PathBuf },

    /// `ib init` found an existing workspace.
    #[error("Already initialized at {path} (use --force to overwrite)")]
    AlreadyInitialized { path: PathBuf },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Multiple validation errors occurred.
    #[error("Validation errors: {}", join_errors(errors))]
    ValidationErrors { errors: Vec<ValidationError> },

    // === Issue Errors ===
    /// A partial id matched more than one issue.
    #[error("Ambiguous ID '{partial}': matches {}", matches.join(", "))]
    AmbiguousId {
        partial: String,
        matches: Vec<String>,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Store Errors ===
    #[error(transparent)]
    Store(#[from] StoreError),

    // === I/O Errors ===
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A single field validation error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl AppError {
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn from_validation_errors(errors: Vec<ValidationError>) -> Self {
        if errors.len() == 1 {
            let err = &errors[0];
            Self::Validation {
                field: err.field.clone(),
                reason: err.message.clone(),
            }
        } else {
            Self::ValidationErrors { errors }
        }
    }
}

/// Result type using `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
