//! Async driver binding an [`IssueStore`] to an [`IssueApi`].
//!
//! The store is shared as `Rc<RefCell<_>>` and remote writes run as
//! `spawn_local` tasks, so a `RemoteStore` lives on one thread inside a
//! tokio [`LocalSet`](tokio::task::LocalSet). No borrow of the store is
//! held across an await point.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::model::{Issue, NewIssue, Status};
use crate::mutation::{MutationId, Resolution};
use crate::query::IssueUpdate;
use crate::remote::{IssueApi, RemoteError};
use crate::store::{IssueStore, MutationTicket};

/// Awaitable outcome of one remote write.
///
/// Dropping the handle only gives up on the answer; the write still
/// resolves against the store.
#[derive(Debug)]
pub struct MutationHandle {
    mutation: MutationId,
    issue_id: String,
    rx: oneshot::Receiver<Result<Resolution>>,
}

impl MutationHandle {
    #[must_use]
    pub const fn mutation(&self) -> MutationId {
        self.mutation
    }

    #[must_use]
    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    /// Wait for the backend's answer.
    ///
    /// # Errors
    ///
    /// Returns the remote failure (after rollback), or `NetworkFailure` if
    /// the write task was dropped before resolving.
    pub async fn outcome(self) -> Result<Resolution> {
        self.rx.await.unwrap_or_else(|_| {
            Err(StoreError::NetworkFailure {
                reason: format!("write task for mutation {} was dropped", self.mutation),
            })
        })
    }
}

/// Handles for every write of one move.
#[derive(Debug)]
pub struct MoveHandle {
    pub reindex: Vec<MutationHandle>,
    pub primary: MutationHandle,
}

impl MoveHandle {
    /// Wait for all writes of the move.
    ///
    /// # Errors
    ///
    /// Returns the first failure, sibling re-index writes first.
    pub async fn outcome(self) -> Result<Resolution> {
        let mut first_error = None;
        for handle in self.reindex {
            if let Err(e) = handle.outcome().await {
                first_error.get_or_insert(e);
            }
        }
        let primary = self.primary.outcome().await;
        match first_error {
            Some(e) => Err(e),
            None => primary,
        }
    }
}

/// An [`IssueStore`] wired to a backend.
pub struct RemoteStore<A> {
    store: Rc<RefCell<IssueStore>>,
    api: Rc<A>,
}

impl<A> Clone for RemoteStore<A> {
    fn clone(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            api: Rc::clone(&self.api),
        }
    }
}

impl<A: IssueApi + 'static> RemoteStore<A> {
    #[must_use]
    pub fn new(store: IssueStore, api: A) -> Self {
        Self {
            store: Rc::new(RefCell::new(store)),
            api: Rc::new(api),
        }
    }

    /// Borrow the store for reading.
    ///
    /// # Panics
    ///
    /// Panics if the store is mutably borrowed.
    #[must_use]
    pub fn read(&self) -> Ref<'_, IssueStore> {
        self.store.borrow()
    }

    /// Borrow the store for local-only changes (filter, view, listeners).
    ///
    /// # Panics
    ///
    /// Panics if the store is already borrowed.
    #[must_use]
    pub fn store_mut(&self) -> RefMut<'_, IssueStore> {
        self.store.borrow_mut()
    }

    #[must_use]
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Replace the table with the team's issues.
    ///
    /// # Errors
    ///
    /// Returns the converted remote error; the table is left untouched.
    pub async fn load(&self, team_id: &str) -> Result<usize> {
        let limit = self.store.borrow().config().remote_timeout();
        let issues = with_timeout(limit, self.api.list_issues(team_id)).await?;
        let mut store = self.store.borrow_mut();
        store.load(issues);
        Ok(store.read().len())
    }

    /// Create an issue on the backend, then insert the returned record.
    ///
    /// # Errors
    ///
    /// Returns the converted remote error; nothing is inserted.
    pub async fn create(&self, team_id: &str, data: &NewIssue) -> Result<Issue> {
        let limit = self.store.borrow().config().remote_timeout();
        let issue = with_timeout(limit, self.api.create_issue(team_id, data)).await?;
        self.store.borrow_mut().insert(issue.clone());
        Ok(issue)
    }

    /// Apply `update` optimistically and send it to the backend.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if `id` is not in the table.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`.
    pub fn mutate(&self, id: &str, update: IssueUpdate) -> Result<MutationHandle> {
        let ticket = self.store.borrow_mut().mutate(id, update)?;
        Ok(self.spawn_write(ticket))
    }

    /// Move an issue optimistically and send every resulting write.
    ///
    /// Returns `None` when the move is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if `id` is not in the table.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `LocalSet`.
    pub fn move_issue(&self, id: &str, target: &Status, index: usize) -> Result<Option<MoveHandle>> {
        let Some(tickets) = self.store.borrow_mut().move_issue(id, target, index)? else {
            return Ok(None);
        };
        let reindex = tickets
            .reindex
            .into_iter()
            .map(|ticket| self.spawn_write(ticket))
            .collect();
        let primary = self.spawn_write(tickets.primary);
        Ok(Some(MoveHandle { reindex, primary }))
    }

    fn spawn_write(&self, ticket: MutationTicket) -> MutationHandle {
        let (tx, rx) = oneshot::channel();
        let store = Rc::clone(&self.store);
        let api = Rc::clone(&self.api);
        let limit = store.borrow().config().remote_timeout();
        let MutationTicket {
            mutation,
            issue_id,
            update,
        } = ticket;
        let handle_issue = issue_id.clone();

        tokio::task::spawn_local(async move {
            debug!(mutation, issue = %issue_id, "Sending update");
            let outcome = with_timeout(limit, api.update_issue(&issue_id, &update)).await;
            let resolution = store.borrow_mut().resolve(mutation, outcome);
            if let Err(ref e) = resolution {
                warn!(mutation, issue = %issue_id, error = %e, "Remote write failed");
            }
            // The caller may have dropped the handle.
            let _ = tx.send(resolution);
        });

        MutationHandle {
            mutation,
            issue_id: handle_issue,
            rx,
        }
    }
}

async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = std::result::Result<T, RemoteError>>,
) -> std::result::Result<T, RemoteError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(RemoteError::Timeout {
            after_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }))
}
