//! Mutation coordinator: optimistic writes with per-mutation rollback.
//!
//! Each entity with in-flight writes keeps a *base* (its last confirmed
//! state) and the ordered list of pending mutations layered on top. The
//! table always holds `base + layer 1 + ... + layer n`. A mutation's
//! snapshot is the state just below its own layer, so rolling back a later
//! write never erases an earlier one that may still succeed. Resolving a
//! mutation removes its layer; a commit first folds the server's copy of
//! the written fields into the base.
//!
//! Outcomes may arrive out of order. When a newer write commits first, the
//! fields it confirmed are masked out of every older layer still in
//! flight: those layers no longer replay them, and their own echoes cannot
//! overwrite them later.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::model::Issue;
use crate::query::IssueUpdate;
use crate::table::IssueTable;

/// Identifier of one optimistic write.
pub type MutationId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStatus {
    InFlight,
    Committed,
    RolledBack,
}

/// An optimistic write awaiting its remote outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub id: MutationId,
    pub issue_id: String,
    /// Full entity state just before this mutation's layer.
    pub snapshot: Issue,
    pub update: IssueUpdate,
    pub status: MutationStatus,
    /// Timestamp the optimistic write stamped on the entity.
    pub applied_at: DateTime<Utc>,
}

/// Outcome of resolving a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub mutation: PendingMutation,
    /// Entity state after resolution; `None` if it was removed meanwhile.
    pub issue: Option<Issue>,
}

enum Taken {
    Chained(PendingMutation, String),
    Orphan(PendingMutation),
}

#[derive(Debug, Clone)]
struct Chain {
    base: Issue,
    pending: Vec<PendingMutation>,
    /// Per pending layer, the fields a newer committed write has confirmed.
    superseded: HashMap<MutationId, IssueUpdate>,
}

impl Chain {
    /// Recompute every layer's snapshot and the resulting entity state.
    fn rebuild(&mut self) -> Issue {
        let mut state = self.base.clone();
        for layer in &mut self.pending {
            layer.snapshot = state.clone();
            match self.superseded.get(&layer.id) {
                Some(mask) => layer.update.without(mask).apply_to(&mut state),
                None => layer.update.apply_to(&mut state),
            }
            state.updated_at = state.updated_at.max(layer.applied_at);
        }
        state
    }
}

/// Tracks pending mutations and reconciles them against the table.
#[derive(Debug, Default)]
pub struct MutationCoordinator {
    chains: HashMap<String, Chain>,
    /// Pending mutations whose entity was removed locally.
    orphans: HashMap<MutationId, PendingMutation>,
    owners: HashMap<MutationId, String>,
    next_id: MutationId,
}

impl MutationCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Apply `update` to the table immediately and start tracking it.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if `issue_id` is not in the table.
    pub fn begin(
        &mut self,
        table: &mut IssueTable,
        issue_id: &str,
        update: IssueUpdate,
    ) -> Result<PendingMutation> {
        let current = table
            .get(issue_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(issue_id))?;

        let id = self.next_id.max(1);
        self.next_id = id + 1;

        let applied_at = Utc::now();
        let mut next = current.clone();
        update.apply_to(&mut next);
        next.updated_at = applied_at;

        let mutation = PendingMutation {
            id,
            issue_id: issue_id.to_string(),
            snapshot: current.clone(),
            update,
            status: MutationStatus::InFlight,
            applied_at,
        };

        let chain = self
            .chains
            .entry(issue_id.to_string())
            .or_insert_with(|| Chain {
                base: current,
                pending: Vec::new(),
                superseded: HashMap::new(),
            });
        chain.pending.push(mutation.clone());
        self.owners.insert(id, issue_id.to_string());
        table.insert_exact(next);

        debug!(
            mutation = id,
            issue = issue_id,
            fields = ?mutation.update.changed_fields(),
            depth = chain.pending.len(),
            "Applied optimistic update"
        );
        Ok(mutation)
    }

    /// The remote write succeeded; `echo` is the server's record.
    ///
    /// # Errors
    ///
    /// Returns `MutationNotFound` if the id is unknown or already resolved.
    pub fn commit(
        &mut self,
        table: &mut IssueTable,
        mutation_id: MutationId,
        echo: &Issue,
    ) -> Result<Resolution> {
        let (mut mutation, chain_key) = match self.take(mutation_id)? {
            Taken::Chained(mutation, key) => (mutation, key),
            Taken::Orphan(mutation) => {
                return Ok(Self::resolve_orphan(mutation, MutationStatus::Committed));
            }
        };
        mutation.status = MutationStatus::Committed;

        let chain = self
            .chains
            .get_mut(&chain_key)
            .ok_or(StoreError::MutationNotFound { id: mutation_id })?;
        let confirmed = mutation.update.echoed_by(echo);
        match chain.superseded.remove(&mutation_id) {
            Some(mask) => confirmed.without(&mask).apply_to(&mut chain.base),
            None => {
                confirmed.apply_to(&mut chain.base);
                chain.base.updated_at = echo.updated_at;
                chain.base.created_at = echo.created_at;
            }
        }
        for older in chain.pending.iter().filter(|m| m.id < mutation_id) {
            chain
                .superseded
                .entry(older.id)
                .or_default()
                .merge_from(&mutation.update);
        }

        let state = self.settle(table, &chain_key);
        debug!(
            mutation = mutation_id,
            issue = %chain_key,
            "Committed mutation"
        );
        Ok(Resolution {
            mutation,
            issue: Some(state),
        })
    }

    /// The remote write failed; restore the entity without this layer.
    ///
    /// # Errors
    ///
    /// Returns `MutationNotFound` if the id is unknown or already resolved.
    pub fn rollback(&mut self, table: &mut IssueTable, mutation_id: MutationId) -> Result<Resolution> {
        let (mut mutation, chain_key) = match self.take(mutation_id)? {
            Taken::Chained(mutation, key) => (mutation, key),
            Taken::Orphan(mutation) => {
                return Ok(Self::resolve_orphan(mutation, MutationStatus::RolledBack));
            }
        };
        mutation.status = MutationStatus::RolledBack;
        if let Some(chain) = self.chains.get_mut(&chain_key) {
            chain.superseded.remove(&mutation_id);
        }

        let state = self.settle(table, &chain_key);
        warn!(
            mutation = mutation_id,
            issue = %chain_key,
            fields = ?mutation.update.changed_fields(),
            "Rolled back optimistic update"
        );
        Ok(Resolution {
            mutation,
            issue: Some(state),
        })
    }

    /// The entity was removed locally. Its pending mutations still resolve,
    /// but no longer touch the table.
    pub fn forget(&mut self, issue_id: &str) {
        if let Some(chain) = self.chains.remove(issue_id) {
            for mutation in chain.pending {
                self.orphans.insert(mutation.id, mutation);
            }
        }
    }

    /// An authoritative copy of the entity arrived (e.g. a list refresh).
    /// It becomes the new base under any pending layers.
    ///
    /// Returns the resulting entity state.
    pub fn rebase(&mut self, table: &mut IssueTable, issue: Issue) -> Issue {
        let id = issue.id.clone();
        if let Some(chain) = self.chains.get_mut(&id) {
            chain.base = issue;
            let state = chain.rebuild();
            table.insert_exact(state.clone());
            state
        } else {
            table.insert_exact(issue.clone());
            issue
        }
    }

    /// Pending mutations of one entity, oldest first.
    #[must_use]
    pub fn pending_for(&self, issue_id: &str) -> &[PendingMutation] {
        self.chains
            .get(issue_id)
            .map_or(&[], |chain| chain.pending.as_slice())
    }

    #[must_use]
    pub fn get(&self, mutation_id: MutationId) -> Option<&PendingMutation> {
        self.orphans.get(&mutation_id).or_else(|| {
            let owner = self.owners.get(&mutation_id)?;
            self.chains
                .get(owner)?
                .pending
                .iter()
                .find(|m| m.id == mutation_id)
        })
    }

    /// Ids of entities that currently carry pending layers.
    #[must_use]
    pub fn pending_issues(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.chains.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of unresolved mutations.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.owners.len()
    }

    /// Detach a pending mutation from its chain (or the orphan set).
    fn take(&mut self, mutation_id: MutationId) -> Result<Taken> {
        let owner = self
            .owners
            .remove(&mutation_id)
            .ok_or(StoreError::MutationNotFound { id: mutation_id })?;
        if let Some(orphan) = self.orphans.remove(&mutation_id) {
            return Ok(Taken::Orphan(orphan));
        }

        let chain = self
            .chains
            .get_mut(&owner)
            .ok_or(StoreError::MutationNotFound { id: mutation_id })?;
        let pos = chain
            .pending
            .iter()
            .position(|m| m.id == mutation_id)
            .ok_or(StoreError::MutationNotFound { id: mutation_id })?;
        Ok(Taken::Chained(chain.pending.remove(pos), owner))
    }

    fn resolve_orphan(mut mutation: PendingMutation, status: MutationStatus) -> Resolution {
        mutation.status = status;
        debug!(
            mutation = mutation.id,
            issue = %mutation.issue_id,
            ?status,
            "Resolved mutation for removed issue; table untouched"
        );
        Resolution {
            mutation,
            issue: None,
        }
    }

    /// Write the chain's current state to the table; drop the chain once
    /// nothing is pending.
    fn settle(&mut self, table: &mut IssueTable, issue_id: &str) -> Issue {
        let Some(chain) = self.chains.get_mut(issue_id) else {
            return table.get(issue_id).cloned().unwrap_or_default();
        };
        let state = chain.rebuild();
        if chain.pending.is_empty() {
            self.chains.remove(issue_id);
        }
        table.insert_exact(state.clone());
        state
    }
}
