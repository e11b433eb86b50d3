//! `issueboard` - issue board CLI over an optimistic client-side store
//!
//! This crate provides the `ib` command. The store itself (entity table,
//! filtering, rank ordering, optimistic mutations) lives in `issue_store`;
//! this crate adds the file-backed backend and the command layer.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface using clap
//! - [`backend`] - JSONL-file implementation of `issue_store::IssueApi`
//! - [`config`] - Configuration management
//! - [`error`] - Error types and handling
//! - [`format`] - Output formatting (text, JSON)
//! - [`logging`] - tracing subscriber setup
//! - [`util`] - Utility functions (id generation and resolution)
//! - [`validation`] - Field rules enforced by the backend

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod util;
pub mod validation;

pub use error::{AppError, Result};

/// Run the CLI application.
///
/// This is the main entry point called from `main()`.
///
/// # Errors
///
/// Returns an error if command execution fails.
pub fn run() -> anyhow::Result<()> {
    cli::run()
}
