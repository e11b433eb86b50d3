//! Validation helpers for payloads accepted by the JSONL backend.
//!
//! These routines return structured validation errors without touching
//! the data file.

use issue_store::{Issue, IssueUpdate, NewIssue, Priority};

use crate::error::ValidationError;

const MAX_TITLE_LEN: usize = 500;
const MAX_DESCRIPTION_LEN: usize = 102_400;
const MAX_NAME_LEN: usize = 200;

/// Validates issue fields and invariants.
pub struct IssueValidator;

impl IssueValidator {
    /// Validate a stored issue and return all validation errors found.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate(issue: &Issue) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        // ID: Required, TEAM-hash format.
        if issue.id.trim().is_empty() {
            errors.push(ValidationError::new("id", "cannot be empty"));
        } else if !is_valid_id_format(&issue.id) {
            errors.push(ValidationError::new(
                "id",
                "invalid format (expected TEAM-hash)",
            ));
        }

        check_title(&issue.title, &mut errors);
        check_description(issue.description.as_deref(), &mut errors);
        check_priority(issue.priority, &mut errors);
        check_rank(issue.rank, &mut errors);
        check_name("assignee", issue.assignee.as_deref(), &mut errors);
        check_name("project", issue.project.as_deref(), &mut errors);
        check_name("cycle", issue.cycle.as_deref(), &mut errors);

        // Timestamps: created_at <= updated_at.
        if issue.updated_at < issue.created_at {
            errors.push(ValidationError::new(
                "updated_at",
                "cannot be before created_at",
            ));
        }

        finish(errors)
    }

    /// Validate a create payload.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_new(data: &NewIssue) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        check_title(&data.title, &mut errors);
        check_description(data.description.as_deref(), &mut errors);
        check_priority(data.priority, &mut errors);
        if let Some(rank) = data.rank {
            check_rank(rank, &mut errors);
        }
        check_name("assignee", data.assignee.as_deref(), &mut errors);
        check_name("project", data.project.as_deref(), &mut errors);
        check_name("cycle", data.cycle.as_deref(), &mut errors);
        finish(errors)
    }

    /// Validate the fields a partial update writes.
    ///
    /// # Errors
    ///
    /// Returns a `Vec<ValidationError>` if any validation rules are violated.
    pub fn validate_update(update: &IssueUpdate) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        if update.is_empty() {
            errors.push(ValidationError::new("update", "no fields to update"));
        }
        if let Some(title) = &update.title {
            check_title(title, &mut errors);
        }
        if let Some(description) = &update.description {
            check_description(description.as_deref(), &mut errors);
        }
        if let Some(priority) = update.priority {
            check_priority(priority, &mut errors);
        }
        if let Some(rank) = update.rank {
            check_rank(rank, &mut errors);
        }
        if let Some(assignee) = &update.assignee {
            check_name("assignee", assignee.as_deref(), &mut errors);
        }
        if let Some(project) = &update.project {
            check_name("project", project.as_deref(), &mut errors);
        }
        if let Some(cycle) = &update.cycle {
            check_name("cycle", cycle.as_deref(), &mut errors);
        }
        finish(errors)
    }
}

fn check_title(title: &str, errors: &mut Vec<ValidationError>) {
    if title.trim().is_empty() {
        errors.push(ValidationError::new("title", "cannot be empty"));
    }
    if title.len() > MAX_TITLE_LEN {
        errors.push(ValidationError::new("title", "exceeds 500 characters"));
    }
}

fn check_description(description: Option<&str>, errors: &mut Vec<ValidationError>) {
    if description.is_some_and(|d| d.len() > MAX_DESCRIPTION_LEN) {
        errors.push(ValidationError::new("description", "exceeds 100KB"));
    }
}

fn check_priority(priority: Priority, errors: &mut Vec<ValidationError>) {
    if !priority.is_valid() {
        errors.push(ValidationError::new("priority", "must be 0-4"));
    }
}

fn check_rank(rank: f64, errors: &mut Vec<ValidationError>) {
    if !rank.is_finite() {
        errors.push(ValidationError::new("rank", "must be a finite number"));
    }
}

fn check_name(field: &str, value: Option<&str>, errors: &mut Vec<ValidationError>) {
    let Some(value) = value else {
        return;
    };
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "cannot be blank"));
    }
    if value.len() > MAX_NAME_LEN {
        errors.push(ValidationError::new(field, "exceeds 200 characters"));
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `TEAM-hash`: uppercase alphanumeric team key, lowercase base36 hash.
#[must_use]
pub fn is_valid_id_format(id: &str) -> bool {
    let Some((team, hash)) = id.split_once('-') else {
        return false;
    };

    if team.is_empty() || team.len() > 10 {
        return false;
    }

    if !team
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return false;
    }

    if hash.len() < 3 || hash.len() > 12 {
        return false;
    }

    hash.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn base_issue() -> Issue {
        Issue {
            id: "ENG-abc123".to_string(),
            team_id: "ENG".to_string(),
            title: "Test issue".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn issue_validation_accepts_base_issue() {
        assert!(IssueValidator::validate(&base_issue()).is_ok());
    }

    #[test]
    fn issue_validation_rejects_empty_title() {
        let mut issue = base_issue();
        issue.title = " ".to_string();

        let errors = IssueValidator::validate(&issue).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "title"));
    }

    #[test]
    fn issue_validation_rejects_bad_priority_and_rank() {
        let mut issue = base_issue();
        issue.priority = Priority(7);
        issue.rank = f64::NAN;

        let errors = IssueValidator::validate(&issue).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "priority"));
        assert!(errors.iter().any(|err| err.field == "rank"));
    }

    #[test]
    fn issue_validation_rejects_time_travel() {
        let mut issue = base_issue();
        issue.updated_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let errors = IssueValidator::validate(&issue).unwrap_err();
        assert!(errors.iter().any(|err| err.field == "updated_at"));
    }

    #[test]
    fn new_issue_requires_title() {
        let errors = IssueValidator::validate_new(&NewIssue::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "title");
    }

    #[test]
    fn update_validation_checks_written_fields_only() {
        let ok = IssueUpdate {
            assignee: Some(None),
            ..Default::default()
        };
        assert!(IssueValidator::validate_update(&ok).is_ok());

        let long = IssueUpdate {
            title: Some("x".repeat(501)),
            ..Default::default()
        };
        let errors = IssueValidator::validate_update(&long).unwrap_err();
        assert_eq!(errors[0].field, "title");

        let empty = IssueValidator::validate_update(&IssueUpdate::default()).unwrap_err();
        assert_eq!(empty[0].field, "update");
    }

    #[test]
    fn id_format() {
        assert!(is_valid_id_format("ENG-a1b"));
        assert!(is_valid_id_format("OPS2-0000zz"));
        assert!(!is_valid_id_format("eng-a1b"));
        assert!(!is_valid_id_format("ENG-A1B"));
        assert!(!is_valid_id_format("ENG-ab"));
        assert!(!is_valid_id_format("ENGab1"));
    }
}
