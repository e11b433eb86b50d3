//! Entity table: the in-memory source of truth, keyed by issue id.
//!
//! Records are replaced wholesale, never edited in place, so a clone taken
//! as a rollback snapshot can't be corrupted by later writes.

use std::collections::HashMap;

use chrono::Utc;

use crate::model::{Issue, Status};

/// Identifier → issue mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueTable {
    issues: HashMap<String, Issue>,
}

impl IssueTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from an authoritative list. Later duplicates overwrite
    /// earlier ones.
    #[must_use]
    pub fn from_issues(issues: impl IntoIterator<Item = Issue>) -> Self {
        let mut table = Self::new();
        for issue in issues {
            table.insert_exact(issue);
        }
        table
    }

    /// Get a single issue by ID.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.issues.get(id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.issues.contains_key(id)
    }

    /// Insert or replace an issue and stamp `updated_at`.
    ///
    /// Returns the replaced record, if any. No field merging happens here.
    pub fn upsert(&mut self, mut issue: Issue) -> Option<Issue> {
        issue.updated_at = Utc::now();
        self.issues.insert(issue.id.clone(), issue)
    }

    /// Insert or replace an issue exactly as given (timestamps untouched).
    pub fn insert_exact(&mut self, issue: Issue) -> Option<Issue> {
        self.issues.insert(issue.id.clone(), issue)
    }

    pub fn remove(&mut self, id: &str) -> Option<Issue> {
        self.issues.remove(id)
    }

    /// All issues, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    /// All issue IDs, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.issues.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Issues of one status, in rank order (ties by identifier).
    #[must_use]
    pub fn group(&self, status: &Status) -> Vec<&Issue> {
        let mut members: Vec<&Issue> = self
            .issues
            .values()
            .filter(|issue| &issue.status == status)
            .collect();
        members.sort_by(|a, b| a.cmp_rank(b));
        members
    }

    /// Get the total number of issues.
    #[must_use]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn clear(&mut self) {
        self.issues.clear();
    }
}
