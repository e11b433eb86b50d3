//! Store facade: the public surface over table, filter, ordering and
//! mutation tracking.
//!
//! Every write is a single synchronous call. Writes that must reach the
//! backend return a [`MutationTicket`]; whoever performs the remote call
//! reports back through [`IssueStore::resolve`].

use std::fmt;

use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::filter::{self, BoardColumn};
use crate::model::{Issue, Status};
use crate::mutation::{MutationCoordinator, MutationId, Resolution};
use crate::order::{MovePlan, OrderManager};
use crate::query::{IssueFilter, IssueUpdate, ViewMode};
use crate::remote::RemoteError;
use crate::table::IssueTable;

/// A table change, delivered to listeners in application order.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// The table was replaced from an authoritative list.
    Loaded { count: usize },
    Inserted { id: String },
    Removed { id: String },
    /// An optimistic update was applied.
    Applied { id: String, mutation: MutationId },
    Committed { id: String, mutation: MutationId },
    /// A failed write was undone. `restored` is false when the issue had
    /// been removed in the meantime.
    RolledBack {
        id: String,
        mutation: MutationId,
        restored: bool,
    },
    /// A status group was re-spaced before a move.
    Reindexed { status: Status, count: usize },
    /// The filter or view mode changed; the derived view is stale.
    FilterChanged,
}

/// Handle returned by [`IssueStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Listener = Box<dyn FnMut(&StoreEvent)>;

/// A write applied locally that still has to be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationTicket {
    pub mutation: MutationId,
    pub issue_id: String,
    pub update: IssueUpdate,
}

/// Writes produced by one drag-and-drop move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTickets {
    pub plan: MovePlan,
    /// Rank rewrites of siblings, if the group had to be re-indexed.
    pub reindex: Vec<MutationTicket>,
    /// The move itself: status and rank in one update.
    pub primary: MutationTicket,
}

impl MoveTickets {
    /// All tickets, siblings first.
    pub fn tickets(&self) -> impl Iterator<Item = &MutationTicket> {
        self.reindex.iter().chain(std::iter::once(&self.primary))
    }
}

/// Client-side issue store.
pub struct IssueStore {
    config: StoreConfig,
    table: IssueTable,
    coordinator: MutationCoordinator,
    order: OrderManager,
    filter: IssueFilter,
    view: ViewMode,
    listeners: Vec<(Subscription, Listener)>,
    next_subscription: u64,
    version: u64,
}

impl fmt::Debug for IssueStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueStore")
            .field("issues", &self.table.len())
            .field("pending", &self.coordinator.pending_count())
            .field("filter", &self.filter)
            .field("view", &self.view)
            .field("listeners", &self.listeners.len())
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

impl IssueStore {
    /// Create an empty store.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config` fails validation.
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            order: OrderManager::from_config(&config),
            config,
            table: IssueTable::new(),
            coordinator: MutationCoordinator::new(),
            filter: IssueFilter::default(),
            view: ViewMode::default(),
            listeners: Vec::new(),
            next_subscription: 1,
            version: 0,
        })
    }

    /// Create a store seeded with `issues`, kept exactly as given.
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config` fails validation.
    pub fn with_issues(config: StoreConfig, issues: impl IntoIterator<Item = Issue>) -> Result<Self> {
        let mut store = Self::new(config)?;
        store.table = IssueTable::from_issues(issues);
        Ok(store)
    }

    // === Reads ===

    #[must_use]
    pub const fn read(&self) -> &IssueTable {
        &self.table
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Issue> {
        self.table.get(id)
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub const fn filter(&self) -> &IssueFilter {
        &self.filter
    }

    #[must_use]
    pub const fn view_mode(&self) -> ViewMode {
        self.view
    }

    /// Visible issues under the current filter and view mode.
    #[must_use]
    pub fn view(&self) -> Vec<Issue> {
        filter::apply(&self.table, &self.filter, self.view)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Board columns under the current filter.
    #[must_use]
    pub fn board(&self) -> Vec<BoardColumn> {
        filter::board(&self.table, &self.filter)
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.coordinator.pending_count()
    }

    #[must_use]
    pub fn pending_for(&self, id: &str) -> usize {
        self.coordinator.pending_for(id).len()
    }

    /// Bumped on every change a listener would see. Renderers can skip
    /// recomputing the view while it is unchanged.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // === Subscriptions ===

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> Subscription {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((subscription, Box::new(listener)));
        subscription
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(s, _)| *s != subscription);
        self.listeners.len() != before
    }

    // === Filtering ===

    pub fn set_filter(&mut self, filter: IssueFilter) {
        self.filter = filter;
        self.emit(StoreEvent::FilterChanged);
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(IssueFilter::default());
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
        self.emit(StoreEvent::FilterChanged);
    }

    // === Authoritative writes ===

    /// Replace the table with the backend's list.
    ///
    /// Issues with pending mutations keep those layers on top of the new
    /// copy; pending issues missing from the list are dropped.
    pub fn load(&mut self, issues: impl IntoIterator<Item = Issue>) {
        let pending = self.coordinator.pending_issues();
        self.table.clear();
        for issue in issues {
            self.coordinator.rebase(&mut self.table, issue);
        }
        for id in pending {
            if !self.table.contains(&id) {
                self.coordinator.forget(&id);
            }
        }
        let count = self.table.len();
        info!(count, "Loaded issues");
        self.emit(StoreEvent::Loaded { count });
    }

    /// Add or replace one issue as received from the backend.
    pub fn insert(&mut self, issue: Issue) {
        let id = issue.id.clone();
        self.coordinator.rebase(&mut self.table, issue);
        debug!(issue = %id, "Inserted issue");
        self.emit(StoreEvent::Inserted { id });
    }

    /// Drop an issue locally. Pending writes on it still resolve but leave
    /// the table alone.
    pub fn remove(&mut self, id: &str) -> Option<Issue> {
        let removed = self.table.remove(id)?;
        self.coordinator.forget(id);
        debug!(issue = %id, "Removed issue");
        self.emit(StoreEvent::Removed { id: id.to_string() });
        Some(removed)
    }

    // === Optimistic writes ===

    /// Apply `update` immediately and return the ticket to send remotely.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if `id` is not in the table.
    pub fn mutate(&mut self, id: &str, update: IssueUpdate) -> Result<MutationTicket> {
        let pending = self.coordinator.begin(&mut self.table, id, update)?;
        self.emit(StoreEvent::Applied {
            id: pending.issue_id.clone(),
            mutation: pending.id,
        });
        Ok(MutationTicket {
            mutation: pending.id,
            issue_id: pending.issue_id,
            update: pending.update,
        })
    }

    /// Move `id` to position `index` of the `target` status group.
    ///
    /// Returns `None` when the issue already sits there.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if `id` is not in the table.
    pub fn move_issue(
        &mut self,
        id: &str,
        target: &Status,
        index: usize,
    ) -> Result<Option<MoveTickets>> {
        let Some(plan) = self.order.plan_move(&self.table, id, target, index)? else {
            debug!(issue = %id, group = %target, index, "Move is a no-op");
            return Ok(None);
        };

        let mut reindex = Vec::with_capacity(plan.reindex.len());
        for (sibling, rank) in &plan.reindex {
            reindex.push(self.mutate(sibling, IssueUpdate::rank(*rank))?);
        }
        if !reindex.is_empty() {
            self.emit(StoreEvent::Reindexed {
                status: target.clone(),
                count: reindex.len(),
            });
        }

        let primary = self.mutate(id, plan.update.clone())?;
        Ok(Some(MoveTickets {
            plan,
            reindex,
            primary,
        }))
    }

    /// Report the remote outcome of a mutation.
    ///
    /// On success the server's copy of the written fields and its
    /// timestamps become authoritative. On failure the mutation is rolled
    /// back and the remote error is returned.
    ///
    /// # Errors
    ///
    /// Returns `MutationNotFound` for an unknown or already-resolved id,
    /// otherwise the converted remote error after rollback.
    pub fn resolve(
        &mut self,
        mutation: MutationId,
        outcome: std::result::Result<Issue, RemoteError>,
    ) -> Result<Resolution> {
        match outcome {
            Ok(echo) => {
                let resolution = self.coordinator.commit(&mut self.table, mutation, &echo)?;
                self.emit(StoreEvent::Committed {
                    id: resolution.mutation.issue_id.clone(),
                    mutation,
                });
                Ok(resolution)
            }
            Err(remote) => {
                let resolution = self.coordinator.rollback(&mut self.table, mutation)?;
                self.emit(StoreEvent::RolledBack {
                    id: resolution.mutation.issue_id.clone(),
                    mutation,
                    restored: resolution.issue.is_some(),
                });
                Err(StoreError::from(remote))
            }
        }
    }

    fn emit(&mut self, event: StoreEvent) {
        self.version += 1;
        for (_, listener) in &mut self.listeners {
            listener(&event);
        }
    }
}
