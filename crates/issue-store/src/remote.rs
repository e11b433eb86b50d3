//! The REST client seam.
//!
//! The store never performs I/O itself; whatever talks to the backend
//! implements [`IssueApi`] and is driven by
//! [`RemoteStore`](crate::driver::RemoteStore).

use thiserror::Error;

use crate::model::{Issue, NewIssue};
use crate::query::IssueUpdate;

/// Failure of a remote call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The backend refused the payload (validation, permissions, conflict).
    #[error("rejected: {reason}")]
    Rejected { reason: String },

    /// The backend could not be reached or the call failed in transit.
    #[error("network error: {reason}")]
    Network { reason: String },

    /// No answer within the configured timeout.
    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl RemoteError {
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn network(reason: impl Into<String>) -> Self {
        Self::Network {
            reason: reason.into(),
        }
    }
}

/// Operations consumed from the issue backend.
///
/// Futures are driven on a single-threaded executor and need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait IssueApi {
    /// All issues of a team.
    async fn list_issues(&self, team_id: &str) -> Result<Vec<Issue>, RemoteError>;

    /// Create an issue; the response carries the assigned id and timestamps.
    async fn create_issue(&self, team_id: &str, data: &NewIssue) -> Result<Issue, RemoteError>;

    /// Apply a partial update; the response is the full authoritative record.
    async fn update_issue(&self, id: &str, update: &IssueUpdate) -> Result<Issue, RemoteError>;
}
