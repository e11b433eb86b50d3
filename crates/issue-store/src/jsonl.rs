//! JSONL snapshots of the issue table.
//!
//! One complete `Issue` per line. Blank lines are ignored on load.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::model::Issue;

/// Load issues from a JSONL file.
///
/// # Errors
///
/// Returns `FileNotFound` if the file does not exist, `Io` if it cannot be
/// read, or `JsonlParse` if any line is invalid.
pub fn load(path: &Path) -> Result<Vec<Issue>> {
    let file = fs::File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StoreError::FileNotFound(path.to_path_buf())
        } else {
            StoreError::Io(e)
        }
    })?;
    let reader = BufReader::new(file);

    let mut issues = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let issue: Issue = serde_json::from_str(trimmed).map_err(|e| StoreError::JsonlParse {
            line: line_num + 1,
            reason: e.to_string(),
        })?;
        issues.push(issue);
    }

    Ok(issues)
}

/// Save issues to a JSONL file, ordered by id so diffs stay small.
///
/// Writes to a temp file next to `path` and renames it into place.
///
/// # Errors
///
/// Returns `Io` if the file cannot be written.
pub fn save<'a>(path: &Path, issues: impl IntoIterator<Item = &'a Issue>) -> Result<()> {
    let mut sorted: Vec<&Issue> = issues.into_iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let tmp_path = path.with_extension("jsonl.tmp");
    let mut file = fs::File::create(&tmp_path)?;
    for issue in sorted {
        let json = serde_json::to_string(issue)?;
        writeln!(file, "{json}")?;
    }
    file.flush()?;
    drop(file);

    fs::rename(&tmp_path, path)?;
    Ok(())
}
