//! Partial updates, filter specifications and view modes.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;
use crate::model::{Issue, Priority, Status};

/// Fields to update on an issue. `None` leaves a field unchanged;
/// for optional fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl IssueUpdate {
    /// A rank-only update, as issued for re-indexed siblings.
    #[must_use]
    pub fn rank(rank: f64) -> Self {
        Self {
            rank: Some(rank),
            ..Default::default()
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.assignee.is_none()
            && self.project.is_none()
            && self.cycle.is_none()
            && self.rank.is_none()
            && self.labels.is_none()
    }

    /// Names of the fields this update writes.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.priority.is_some() {
            fields.push("priority");
        }
        if self.assignee.is_some() {
            fields.push("assignee");
        }
        if self.project.is_some() {
            fields.push("project");
        }
        if self.cycle.is_some() {
            fields.push("cycle");
        }
        if self.rank.is_some() {
            fields.push("rank");
        }
        if self.labels.is_some() {
            fields.push("labels");
        }
        fields
    }

    /// Merge the present fields into `issue`. Timestamps are left alone.
    pub fn apply_to(&self, issue: &mut Issue) {
        if let Some(ref title) = self.title {
            issue.title.clone_from(title);
        }
        if let Some(ref desc) = self.description {
            issue.description.clone_from(desc);
        }
        if let Some(ref status) = self.status {
            issue.status = status.clone();
        }
        if let Some(priority) = self.priority {
            issue.priority = priority;
        }
        if let Some(ref assignee) = self.assignee {
            issue.assignee.clone_from(assignee);
        }
        if let Some(ref project) = self.project {
            issue.project.clone_from(project);
        }
        if let Some(ref cycle) = self.cycle {
            issue.cycle.clone_from(cycle);
        }
        if let Some(rank) = self.rank {
            issue.rank = rank;
        }
        if let Some(ref labels) = self.labels {
            issue.labels.clone_from(labels);
        }
    }

    /// `self` minus every field `other` writes.
    #[must_use]
    pub fn without(&self, other: &Self) -> Self {
        Self {
            title: self.title.clone().filter(|_| other.title.is_none()),
            description: self.description.clone().filter(|_| other.description.is_none()),
            status: self.status.clone().filter(|_| other.status.is_none()),
            priority: self.priority.filter(|_| other.priority.is_none()),
            assignee: self.assignee.clone().filter(|_| other.assignee.is_none()),
            project: self.project.clone().filter(|_| other.project.is_none()),
            cycle: self.cycle.clone().filter(|_| other.cycle.is_none()),
            rank: self.rank.filter(|_| other.rank.is_none()),
            labels: self.labels.clone().filter(|_| other.labels.is_none()),
        }
    }

    /// Overlay the fields `newer` writes onto `self`.
    pub fn merge_from(&mut self, newer: &Self) {
        if newer.title.is_some() {
            self.title.clone_from(&newer.title);
        }
        if newer.description.is_some() {
            self.description.clone_from(&newer.description);
        }
        if newer.status.is_some() {
            self.status.clone_from(&newer.status);
        }
        if newer.priority.is_some() {
            self.priority = newer.priority;
        }
        if newer.assignee.is_some() {
            self.assignee.clone_from(&newer.assignee);
        }
        if newer.project.is_some() {
            self.project.clone_from(&newer.project);
        }
        if newer.cycle.is_some() {
            self.cycle.clone_from(&newer.cycle);
        }
        if newer.rank.is_some() {
            self.rank = newer.rank;
        }
        if newer.labels.is_some() {
            self.labels.clone_from(&newer.labels);
        }
    }

    /// The same set of fields as `self`, with values taken from `echo`.
    ///
    /// Used on commit: the server's copy of every field the mutation wrote
    /// is authoritative.
    #[must_use]
    pub fn echoed_by(&self, echo: &Issue) -> Self {
        Self {
            title: self.title.as_ref().map(|_| echo.title.clone()),
            description: self.description.as_ref().map(|_| echo.description.clone()),
            status: self.status.as_ref().map(|_| echo.status.clone()),
            priority: self.priority.map(|_| echo.priority),
            assignee: self.assignee.as_ref().map(|_| echo.assignee.clone()),
            project: self.project.as_ref().map(|_| echo.project.clone()),
            cycle: self.cycle.as_ref().map(|_| echo.cycle.clone()),
            rank: Some(echo.rank),
            labels: self.labels.as_ref().map(|_| echo.labels.clone()),
        }
    }
}

/// Filter specification for the derived view.
///
/// Every present predicate must match (AND). An absent predicate, an empty
/// set, or a blank search string places no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub statuses: Option<Vec<Status>>,
    pub priorities: Option<Vec<Priority>>,
    pub assignees: Option<Vec<String>>,
    pub project: Option<String>,
    pub cycle: Option<String>,
    /// Case-insensitive substring over title, identifier and description.
    pub search: Option<String>,
}

impl IssueFilter {
    /// True when no predicate is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.as_ref().is_none_or(Vec::is_empty)
            && self.priorities.as_ref().is_none_or(Vec::is_empty)
            && self.assignees.as_ref().is_none_or(Vec::is_empty)
            && self.project.is_none()
            && self.cycle.is_none()
            && self.search.as_ref().is_none_or(|s| s.trim().is_empty())
    }
}

/// Field the list view groups by before falling back to rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortField {
    /// Rank only, no grouping.
    #[default]
    Manual,
    Status,
    /// Urgent first, no priority last.
    Priority,
    Assignee,
    Project,
    Cycle,
    /// Most recently updated first.
    UpdatedAt,
    /// Most recently created first.
    CreatedAt,
}

impl SortField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Status => "status",
            Self::Priority => "priority",
            Self::Assignee => "assignee",
            Self::Project => "project",
            Self::Cycle => "cycle",
            Self::UpdatedAt => "updated_at",
            Self::CreatedAt => "created_at",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" | "rank" => Ok(Self::Manual),
            "status" => Ok(Self::Status),
            "priority" => Ok(Self::Priority),
            "assignee" => Ok(Self::Assignee),
            "project" => Ok(Self::Project),
            "cycle" => Ok(Self::Cycle),
            "updated_at" | "updated" => Ok(Self::UpdatedAt),
            "created_at" | "created" => Ok(Self::CreatedAt),
            other => Err(StoreError::InvalidSortField {
                field: other.to_string(),
            }),
        }
    }
}

/// How the derived view is grouped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ViewMode {
    /// Grouped by status in workflow order.
    #[default]
    Board,
    /// Grouped by the declared sort field.
    List(SortField),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_drops_fields_written_by_other() {
        let older = IssueUpdate {
            title: Some("old".to_string()),
            priority: Some(Priority::HIGH),
            assignee: Some(None),
            ..Default::default()
        };
        let newer = IssueUpdate {
            title: Some("new".to_string()),
            assignee: Some(Some("bo".to_string())),
            ..Default::default()
        };
        let rest = older.without(&newer);
        assert_eq!(rest.changed_fields(), vec!["priority"]);

        let mut mask = IssueUpdate::default();
        mask.merge_from(&newer);
        mask.merge_from(&IssueUpdate::rank(3.0));
        assert_eq!(mask.changed_fields(), vec!["title", "assignee", "rank"]);
    }

    #[test]
    fn test_apply_to_clears_optional_fields() {
        let mut issue = Issue {
            id: "ENG-1".to_string(),
            title: "Old".to_string(),
            assignee: Some("ana".to_string()),
            ..Default::default()
        };
        let update = IssueUpdate {
            title: Some("New".to_string()),
            assignee: Some(None),
            ..Default::default()
        };
        update.apply_to(&mut issue);
        assert_eq!(issue.title, "New");
        assert!(issue.assignee.is_none());
    }

    #[test]
    fn test_echoed_by_takes_server_values_for_written_fields() {
        let update = IssueUpdate {
            title: Some("x".to_string()),
            ..Default::default()
        };
        let echo = Issue {
            title: "X (normalized)".to_string(),
            priority: Priority::HIGH,
            rank: 7.0,
            ..Default::default()
        };
        let auth = update.echoed_by(&echo);
        assert_eq!(auth.title.as_deref(), Some("X (normalized)"));
        assert_eq!(auth.rank, Some(7.0));
        assert!(auth.priority.is_none());
    }

    #[test]
    fn test_filter_empty_sets_are_inactive() {
        let filter = IssueFilter {
            statuses: Some(Vec::new()),
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        let active = IssueFilter {
            project: Some("web".to_string()),
            ..Default::default()
        };
        assert!(!active.is_empty());
    }

    #[test]
    fn test_sort_field_aliases() {
        assert_eq!("updated".parse::<SortField>().unwrap(), SortField::UpdatedAt);
        assert_eq!("RANK".parse::<SortField>().unwrap(), SortField::Manual);
        assert!("size".parse::<SortField>().is_err());
    }

    #[test]
    fn test_changed_fields() {
        let update = IssueUpdate {
            status: Some(Status::Done),
            rank: Some(2.0),
            ..Default::default()
        };
        assert_eq!(update.changed_fields(), vec!["status", "rank"]);
        assert!(IssueUpdate::default().is_empty());
    }
}
