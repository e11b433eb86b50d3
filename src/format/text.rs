//! Text formatting functions for `ib`.
//!
//! Provides plain text (non-ANSI) formatting for terminal output:
//! - Status icons (◌ ○ ◐ ✓ ✗)
//! - Priority labels (P0-P4)
//! - Issue lines and board columns, with titles clipped by display width

use issue_store::{BoardColumn, Issue, Priority, Status};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest title shown on one line before clipping.
pub const MAX_TITLE_WIDTH: usize = 60;

/// Status icon characters.
pub mod icons {
    /// Backlog - not yet planned (dotted circle).
    pub const BACKLOG: &str = "◌";
    /// Todo - planned, not started (hollow circle).
    pub const TODO: &str = "○";
    /// In progress - active work (half-filled).
    pub const IN_PROGRESS: &str = "◐";
    /// Done - completed (checkmark).
    pub const DONE: &str = "✓";
    /// Canceled (X mark).
    pub const CANCELED: &str = "✗";
    /// Custom status.
    pub const CUSTOM: &str = "?";
}

/// Return the icon character for a status.
#[must_use]
pub const fn format_status_icon(status: &Status) -> &'static str {
    match status {
        Status::Backlog => icons::BACKLOG,
        Status::Todo => icons::TODO,
        Status::InProgress => icons::IN_PROGRESS,
        Status::Done => icons::DONE,
        Status::Canceled => icons::CANCELED,
        Status::Custom(_) => icons::CUSTOM,
    }
}

/// Format priority as "P0", "P1", etc.
#[must_use]
pub fn format_priority(priority: Priority) -> String {
    format!("P{}", priority.0)
}

/// Clip `text` to `max_width` terminal columns, marking the cut with `…`.
#[must_use]
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// Format a single-line issue summary.
///
/// Format: `{icon} {id} [{priority}] {title}` plus ` @assignee` when set.
#[must_use]
pub fn format_issue_line(issue: &Issue) -> String {
    let mut line = format!(
        "{} {} [{}] {}",
        format_status_icon(&issue.status),
        issue.id,
        format_priority(issue.priority),
        truncate_to_width(&issue.title, MAX_TITLE_WIDTH),
    );
    if let Some(assignee) = &issue.assignee {
        line.push_str(" @");
        line.push_str(assignee);
    }
    line
}

/// Render board columns one after another, each with a header and count.
#[must_use]
pub fn format_board(columns: &[BoardColumn]) -> String {
    let mut out = String::new();
    for (n, column) in columns.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "{} {} ({})\n",
            format_status_icon(&column.status),
            column.status,
            column.issues.len()
        ));
        for issue in &column.issues {
            out.push_str("  ");
            out.push_str(&format_issue_line(issue));
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_test_issue() -> Issue {
        Issue {
            id: "ENG-a1b".to_string(),
            team_id: "ENG".to_string(),
            title: "Test title".to_string(),
            priority: Priority::MEDIUM,
            ..Default::default()
        }
    }

    #[test]
    fn test_status_icons() {
        assert_eq!(format_status_icon(&Status::Backlog), "◌");
        assert_eq!(format_status_icon(&Status::Todo), "○");
        assert_eq!(format_status_icon(&Status::InProgress), "◐");
        assert_eq!(format_status_icon(&Status::Done), "✓");
        assert_eq!(format_status_icon(&Status::Canceled), "✗");
        assert_eq!(format_status_icon(&Status::Custom("qa".to_string())), "?");
    }

    #[test]
    fn test_format_priority() {
        assert_eq!(format_priority(Priority::NONE), "P0");
        assert_eq!(format_priority(Priority::URGENT), "P1");
        assert_eq!(format_priority(Priority::LOW), "P4");
    }

    #[test]
    fn test_format_issue_line() {
        let issue = make_test_issue();
        assert_eq!(format_issue_line(&issue), "○ ENG-a1b [P3] Test title");
    }

    #[test]
    fn test_format_issue_line_with_assignee() {
        let mut issue = make_test_issue();
        issue.status = Status::InProgress;
        issue.assignee = Some("ana".to_string());
        let line = format_issue_line(&issue);
        assert!(line.starts_with('◐'));
        assert!(line.ends_with(" @ana"));
    }

    #[test]
    fn test_truncate_by_display_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        // Wide characters count double
        assert_eq!(truncate_to_width("日本語のタイトル", 7), "日本語…");
    }

    #[test]
    fn test_format_board() {
        let columns = vec![
            BoardColumn {
                status: Status::Todo,
                issues: vec![make_test_issue()],
            },
            BoardColumn {
                status: Status::Done,
                issues: vec![],
            },
        ];
        let text = format_board(&columns);
        assert_eq!(
            text,
            "○ todo (1)\n  ○ ENG-a1b [P3] Test title\n\n✓ done (0)\n"
        );
    }

    proptest! {
        #[test]
        fn prop_truncate_fits_width(text in "[a-zA-Z0-9 日本語のタイトル]{0,80}", width in 1usize..40) {
            let clipped = truncate_to_width(&text, width);
            prop_assert!(clipped.width() <= width);
            if text.width() <= width {
                prop_assert_eq!(clipped, text);
            } else {
                prop_assert!(clipped.ends_with('…'));
            }
        }
    }
}
