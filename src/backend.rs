//! JSONL-file backend implementing [`IssueApi`].
//!
//! Stands in for the REST service: every call reads the data file,
//! validates the payload, and writes the file back atomically. The server
//! side owns ids and timestamps.

use std::path::{Path, PathBuf};

use chrono::Utc;
use issue_store::jsonl;
use issue_store::{
    Issue, IssueApi, IssueTable, IssueUpdate, NewIssue, OrderManager, RemoteError, StoreConfig,
    StoreError,
};
use tracing::debug;

use crate::error::ValidationError;
use crate::util::id::IdGenerator;
use crate::validation::IssueValidator;

/// Issue backend over a single JSONL file.
#[derive(Debug, Clone)]
pub struct JsonlBackend {
    path: PathBuf,
    order: OrderManager,
}

impl JsonlBackend {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, store: &StoreConfig) -> Self {
        Self {
            path: path.into(),
            order: OrderManager::from_config(store),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<IssueTable, RemoteError> {
        match jsonl::load(&self.path) {
            Ok(issues) => Ok(IssueTable::from_issues(issues)),
            Err(StoreError::FileNotFound(_)) => Ok(IssueTable::new()),
            Err(e) => Err(RemoteError::network(e.to_string())),
        }
    }

    fn write_all(&self, table: &IssueTable) -> Result<(), RemoteError> {
        jsonl::save(&self.path, table.values()).map_err(|e| RemoteError::network(e.to_string()))
    }
}

impl IssueApi for JsonlBackend {
    async fn list_issues(&self, team_id: &str) -> Result<Vec<Issue>, RemoteError> {
        let table = self.read_all()?;
        let issues: Vec<Issue> = table
            .values()
            .filter(|issue| issue.team_id == team_id)
            .cloned()
            .collect();
        debug!(team = team_id, count = issues.len(), "Listed issues");
        Ok(issues)
    }

    async fn create_issue(&self, team_id: &str, data: &NewIssue) -> Result<Issue, RemoteError> {
        IssueValidator::validate_new(data).map_err(reject)?;
        let mut table = self.read_all()?;

        let now = Utc::now();
        let team_size = table.values().filter(|i| i.team_id == team_id).count();
        let id = IdGenerator::for_team(team_id).generate(&data.title, now, team_size, |id| {
            table.contains(id)
        });
        let rank = data.rank.unwrap_or_else(|| {
            let column: Vec<&Issue> = table
                .group(&data.status)
                .into_iter()
                .filter(|issue| issue.team_id == team_id)
                .collect();
            self.order.append_rank(&column)
        });

        let issue = Issue {
            id,
            team_id: team_id.to_string(),
            title: data.title.trim().to_string(),
            description: data.description.clone(),
            status: data.status.clone(),
            priority: data.priority,
            assignee: data.assignee.clone(),
            project: data.project.clone(),
            cycle: data.cycle.clone(),
            rank,
            labels: data.labels.clone(),
            created_at: now,
            updated_at: now,
        };
        IssueValidator::validate(&issue).map_err(reject)?;

        table.insert_exact(issue.clone());
        self.write_all(&table)?;
        debug!(id = %issue.id, rank, "Created issue");
        Ok(issue)
    }

    async fn update_issue(&self, id: &str, update: &IssueUpdate) -> Result<Issue, RemoteError> {
        IssueValidator::validate_update(update).map_err(reject)?;
        let mut table = self.read_all()?;

        let mut issue = table
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::rejected(format!("issue not found: {id}")))?;
        update.apply_to(&mut issue);
        IssueValidator::validate(&issue).map_err(reject)?;

        table.upsert(issue);
        self.write_all(&table)?;
        let stored = table
            .get(id)
            .cloned()
            .ok_or_else(|| RemoteError::network(format!("issue vanished during write: {id}")))?;
        debug!(id, fields = ?update.changed_fields(), "Updated issue");
        Ok(stored)
    }
}

fn reject(errors: Vec<ValidationError>) -> RemoteError {
    RemoteError::rejected(
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )
}
