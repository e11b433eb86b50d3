//! Filter engine: pure functions from (table, filter, view) to an ordered
//! subset of issues.
//!
//! Output order is grouping key, then rank, then identifier, so the same
//! inputs always yield the same sequence.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::{Issue, Status};
use crate::query::{IssueFilter, SortField, ViewMode};
use crate::table::IssueTable;

/// One board column: a status and its visible issues in rank order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardColumn {
    pub status: Status,
    pub issues: Vec<Issue>,
}

/// Filter and order the table for the given view.
#[must_use]
pub fn apply<'a>(table: &'a IssueTable, filter: &IssueFilter, view: ViewMode) -> Vec<&'a Issue> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut results: Vec<&Issue> = table
        .values()
        .filter(|issue| matches(issue, filter, search.as_deref()))
        .collect();

    results.sort_by(|a, b| compare_group(a, b, view).then_with(|| a.cmp_rank(b)));
    results
}

/// Board view split into status columns.
///
/// All built-in columns are present (possibly empty) unless the filter
/// restricts statuses; custom statuses appear only when they hold issues.
#[must_use]
pub fn board(table: &IssueTable, filter: &IssueFilter) -> Vec<BoardColumn> {
    let mut columns: Vec<BoardColumn> = match filter.statuses.as_ref().filter(|s| !s.is_empty()) {
        Some(statuses) => {
            let mut wanted = statuses.clone();
            wanted.sort();
            wanted.dedup();
            wanted
        }
        None => Status::WORKFLOW.to_vec(),
    }
    .into_iter()
    .map(|status| BoardColumn {
        status,
        issues: Vec::new(),
    })
    .collect();

    for issue in apply(table, filter, ViewMode::Board) {
        if let Some(column) = columns.iter_mut().find(|c| c.status == issue.status) {
            column.issues.push(issue.clone());
        } else {
            columns.push(BoardColumn {
                status: issue.status.clone(),
                issues: vec![issue.clone()],
            });
        }
    }

    columns
}

/// True when `issue` satisfies every active predicate in `filter`.
///
/// `search` is the lowercased, trimmed search text, if any.
fn matches(issue: &Issue, filter: &IssueFilter, search: Option<&str>) -> bool {
    // Status filtering
    if let Some(ref statuses) = filter.statuses {
        if !statuses.is_empty() && !statuses.contains(&issue.status) {
            return false;
        }
    }

    // Priority filtering
    if let Some(ref priorities) = filter.priorities {
        if !priorities.is_empty() && !priorities.contains(&issue.priority) {
            return false;
        }
    }

    // Assignee filtering: unassigned issues never satisfy an assignee set
    if let Some(ref assignees) = filter.assignees {
        if !assignees.is_empty()
            && !issue
                .assignee
                .as_ref()
                .is_some_and(|a| assignees.contains(a))
        {
            return false;
        }
    }

    if let Some(ref project) = filter.project {
        if issue.project.as_deref() != Some(project.as_str()) {
            return false;
        }
    }

    if let Some(ref cycle) = filter.cycle {
        if issue.cycle.as_deref() != Some(cycle.as_str()) {
            return false;
        }
    }

    if let Some(query) = search {
        let hit = issue.title.to_lowercase().contains(query)
            || issue.id.to_lowercase().contains(query)
            || issue
                .description
                .as_ref()
                .is_some_and(|d| d.to_lowercase().contains(query));
        if !hit {
            return false;
        }
    }

    true
}

fn compare_group(a: &Issue, b: &Issue, view: ViewMode) -> Ordering {
    match view {
        ViewMode::Board | ViewMode::List(SortField::Status) => a.status.cmp(&b.status),
        ViewMode::List(SortField::Manual) => Ordering::Equal,
        ViewMode::List(SortField::Priority) => {
            a.priority.urgency_rank().cmp(&b.priority.urgency_rank())
        }
        ViewMode::List(SortField::Assignee) => missing_last(a.assignee.as_ref(), b.assignee.as_ref()),
        ViewMode::List(SortField::Project) => missing_last(a.project.as_ref(), b.project.as_ref()),
        ViewMode::List(SortField::Cycle) => missing_last(a.cycle.as_ref(), b.cycle.as_ref()),
        ViewMode::List(SortField::UpdatedAt) => b.updated_at.cmp(&a.updated_at),
        ViewMode::List(SortField::CreatedAt) => b.created_at.cmp(&a.created_at),
    }
}

fn missing_last(a: Option<&String>, b: Option<&String>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Priority;
    use chrono::{Duration, Utc};

    fn make_issue(id: &str, status: Status, rank: f64) -> Issue {
        Issue {
            id: id.to_string(),
            title: format!("Issue {id}"),
            status,
            rank,
            ..Default::default()
        }
    }

    fn ids(issues: &[&Issue]) -> Vec<String> {
        issues.iter().map(|i| i.id.clone()).collect()
    }

    fn sample_table() -> IssueTable {
        let mut login = make_issue("ENG-1", Status::Todo, 2.0);
        login.title = "Fix login redirect".to_string();
        login.assignee = Some("ana".to_string());
        login.priority = Priority::URGENT;
        login.project = Some("web".to_string());

        let mut search = make_issue("ENG-2", Status::InProgress, 1.0);
        search.title = "Search is slow".to_string();
        search.description = Some("Users report LOGIN page lag too".to_string());
        search.priority = Priority::LOW;

        let mut docs = make_issue("ENG-3", Status::Todo, 1.0);
        docs.title = "Write docs".to_string();
        docs.assignee = Some("bo".to_string());
        docs.cycle = Some("c12".to_string());

        let backlog = make_issue("ENG-4", Status::Backlog, 5.0);

        IssueTable::from_issues([login, search, docs, backlog])
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        let table = sample_table();
        let result = apply(&table, &IssueFilter::default(), ViewMode::Board);
        assert_eq!(result.len(), table.len());
    }

    #[test]
    fn test_board_order_groups_by_status_then_rank() {
        let table = sample_table();
        let result = apply(&table, &IssueFilter::default(), ViewMode::Board);
        assert_eq!(ids(&result), vec!["ENG-4", "ENG-3", "ENG-1", "ENG-2"]);
    }

    #[test]
    fn test_predicates_are_conjunctive() {
        let table = sample_table();
        let filter = IssueFilter {
            statuses: Some(vec![Status::Todo]),
            assignees: Some(vec!["bo".to_string(), "ana".to_string()]),
            priorities: Some(vec![Priority::URGENT]),
            ..Default::default()
        };
        let result = apply(&table, &filter, ViewMode::Board);
        assert_eq!(ids(&result), vec!["ENG-1"]);
    }

    #[test]
    fn test_assignee_filter_excludes_unassigned() {
        let table = sample_table();
        let filter = IssueFilter {
            assignees: Some(vec!["ana".to_string()]),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&table, &filter, ViewMode::Board)), vec!["ENG-1"]);
    }

    #[test]
    fn test_search_matches_title_id_and_description() {
        let table = sample_table();
        let filter = IssueFilter {
            search: Some("login".to_string()),
            ..Default::default()
        };
        let result = apply(&table, &filter, ViewMode::Board);
        assert_eq!(ids(&result), vec!["ENG-1", "ENG-2"]);

        let by_id = IssueFilter {
            search: Some("eng-3".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&table, &by_id, ViewMode::Board)), vec!["ENG-3"]);
    }

    #[test]
    fn test_project_and_cycle_equality() {
        let table = sample_table();
        let project = IssueFilter {
            project: Some("web".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&table, &project, ViewMode::Board)), vec!["ENG-1"]);

        let cycle = IssueFilter {
            cycle: Some("c12".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&apply(&table, &cycle, ViewMode::Board)), vec!["ENG-3"]);
    }

    #[test]
    fn test_list_view_priority_puts_no_priority_last() {
        let table = sample_table();
        let result = apply(
            &table,
            &IssueFilter::default(),
            ViewMode::List(SortField::Priority),
        );
        // urgent, low, then the two "no priority" issues by rank/id
        assert_eq!(ids(&result), vec!["ENG-1", "ENG-2", "ENG-3", "ENG-4"]);
    }

    #[test]
    fn test_list_view_updated_most_recent_first() {
        let mut table = sample_table();
        let mut old = table.get("ENG-4").unwrap().clone();
        old.updated_at = Utc::now() - Duration::days(30);
        table.insert_exact(old);
        let mut fresh = table.get("ENG-3").unwrap().clone();
        fresh.updated_at = Utc::now() + Duration::days(1);
        table.insert_exact(fresh);

        let result = apply(
            &table,
            &IssueFilter::default(),
            ViewMode::List(SortField::UpdatedAt),
        );
        assert_eq!(result.first().unwrap().id, "ENG-3");
        assert_eq!(result.last().unwrap().id, "ENG-4");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let table = sample_table();
        let filter = IssueFilter {
            search: Some("s".to_string()),
            ..Default::default()
        };
        let first = apply(&table, &filter, ViewMode::List(SortField::Assignee));
        let second = apply(&table, &filter, ViewMode::List(SortField::Assignee));
        assert_eq!(first, second);
    }

    #[test]
    fn test_board_columns() {
        let table = sample_table();
        let columns = board(&table, &IssueFilter::default());
        assert_eq!(columns.len(), Status::WORKFLOW.len());
        let todo = columns.iter().find(|c| c.status == Status::Todo).unwrap();
        let todo_ids: Vec<&str> = todo.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(todo_ids, vec!["ENG-3", "ENG-1"]);
        assert!(columns.iter().find(|c| c.status == Status::Done).unwrap().issues.is_empty());
    }

    #[test]
    fn test_board_columns_restricted_and_custom() {
        let mut table = sample_table();
        table.insert_exact(make_issue("ENG-9", Status::Custom("qa".to_string()), 1.0));

        let restricted = board(
            &table,
            &IssueFilter {
                statuses: Some(vec![Status::InProgress, Status::Todo]),
                ..Default::default()
            },
        );
        let statuses: Vec<Status> = restricted.iter().map(|c| c.status.clone()).collect();
        assert_eq!(statuses, vec![Status::Todo, Status::InProgress]);

        let all = board(&table, &IssueFilter::default());
        assert_eq!(all.last().unwrap().status, Status::Custom("qa".to_string()));
    }
}
