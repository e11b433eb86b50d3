//! Output formatting for `ib`.
//!
//! Supports both human-readable text output and machine-parseable JSON.
//!
//! # JSON Output Types
//!
//! - `list`: array of issues in view order
//! - `board`: array of [`BoardColumn`](issue_store::BoardColumn)s
//! - `create`: the created issue
//! - `update` / `move`: [`WriteResult`]

mod output;
mod text;

pub use output::WriteResult;
pub use text::{
    format_board, format_issue_line, format_priority, format_status_icon, truncate_to_width,
};

use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
