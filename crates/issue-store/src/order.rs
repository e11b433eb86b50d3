//! Order manager: rank placement for drag-and-drop within and across
//! status groups.
//!
//! Interior placement takes the midpoint of the two neighbours; placement
//! at either end steps one `rank_spacing` away from the only neighbour.
//! When two neighbours get closer than `min_rank_gap` (or the midpoint is
//! no longer strictly between them at f64 precision) the group is
//! re-indexed to evenly spaced ranks and placement is retried. Ordinary
//! insertions never touch siblings.

use thiserror::Error;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::model::{Issue, Status};
use crate::query::IssueUpdate;
use crate::table::IssueTable;

/// Bounds of the representable rank range, `[-RANK_LIMIT, RANK_LIMIT]`.
/// 2^53 keeps every multiple of the spacing exactly representable.
pub const RANK_LIMIT: f64 = 9_007_199_254_740_992.0;

/// Rank given to the first issue in an empty group.
pub const NEUTRAL_RANK: f64 = 0.0;

/// Two neighbouring ranks can no longer be split.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("rank precision exhausted between {left} and {right}")]
pub struct PrecisionExhausted {
    pub left: f64,
    pub right: f64,
}

/// The writes needed to carry out one move.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    pub issue_id: String,
    /// Status (when it changes) and rank, applied as one mutation.
    pub update: IssueUpdate,
    /// Sibling rank rewrites from a re-index, in group order. Usually empty.
    pub reindex: Vec<(String, f64)>,
}

#[derive(Debug, Clone, Copy)]
pub struct OrderManager {
    spacing: f64,
    min_gap: f64,
}

impl OrderManager {
    #[must_use]
    pub const fn new(spacing: f64, min_gap: f64) -> Self {
        Self { spacing, min_gap }
    }

    #[must_use]
    pub const fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.rank_spacing, config.min_rank_gap)
    }

    /// Rank for a slot between `left` and `right` (either may be absent).
    ///
    /// # Errors
    ///
    /// Returns `PrecisionExhausted` when the neighbours are too close to split.
    pub fn rank_between(
        &self,
        left: Option<f64>,
        right: Option<f64>,
    ) -> std::result::Result<f64, PrecisionExhausted> {
        match (left, right) {
            (None, None) => Ok(NEUTRAL_RANK),
            (Some(l), None) => {
                let next = l + self.spacing;
                if next <= RANK_LIMIT && next > l {
                    Ok(next)
                } else {
                    self.midpoint(l, RANK_LIMIT)
                }
            }
            (None, Some(r)) => {
                let prev = r - self.spacing;
                if prev >= -RANK_LIMIT && prev < r {
                    Ok(prev)
                } else {
                    self.midpoint(-RANK_LIMIT, r)
                }
            }
            (Some(l), Some(r)) => self.midpoint(l, r),
        }
    }

    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    fn midpoint(&self, left: f64, right: f64) -> std::result::Result<f64, PrecisionExhausted> {
        let exhausted = PrecisionExhausted { left, right };
        // Also rejects NaN and inverted neighbours.
        if !(right - left >= self.min_gap) {
            return Err(exhausted);
        }
        let mid = left + (right - left) / 2.0;
        if left < mid && mid < right {
            Ok(mid)
        } else {
            Err(exhausted)
        }
    }

    /// Rank after the last member of a group.
    #[must_use]
    pub fn append_rank(&self, group: &[&Issue]) -> f64 {
        let last = group.last().map(|issue| issue.rank);
        self.rank_between(last, None)
            .unwrap_or_else(|e| e.left.max(NEUTRAL_RANK))
    }

    /// Evenly spaced ranks for `members`, which must already be in rank order.
    ///
    /// The step shrinks below `rank_spacing` when the group would otherwise
    /// run past `RANK_LIMIT`.
    #[must_use]
    pub fn reindexed(&self, members: &[&Issue]) -> Vec<(String, f64)> {
        let step = self.spacing.min(RANK_LIMIT / (members.len() + 1) as f64);
        members
            .iter()
            .enumerate()
            .map(|(k, issue)| (issue.id.clone(), (k + 1) as f64 * step))
            .collect()
    }

    /// Plan moving `id` to position `index` of the `target` group.
    ///
    /// `index` counts positions in the target group as it looks once the
    /// moved issue has been taken out; it is clamped to the group size.
    /// Returns `None` when the issue already sits at that position.
    ///
    /// # Errors
    ///
    /// Returns `IssueNotFound` if `id` is not in the table.
    pub fn plan_move(
        &self,
        table: &IssueTable,
        id: &str,
        target: &Status,
        index: usize,
    ) -> Result<Option<MovePlan>> {
        let issue = table.get(id).ok_or_else(|| StoreError::not_found(id))?;
        let group = table.group(target);
        let current = group.iter().position(|member| member.id == id);
        let siblings: Vec<&Issue> = group.into_iter().filter(|member| member.id != id).collect();
        let index = index.min(siblings.len());

        if current == Some(index) {
            return Ok(None);
        }

        let status = (issue.status != *target).then(|| target.clone());
        let left = index.checked_sub(1).map(|k| siblings[k].rank);
        let right = siblings.get(index).map(|member| member.rank);

        let (rank, reindex) = match self.rank_between(left, right) {
            Ok(rank) => (rank, Vec::new()),
            Err(exhausted) => {
                info!(
                    group = %target,
                    size = siblings.len(),
                    left = exhausted.left,
                    right = exhausted.right,
                    "Rank precision exhausted; re-indexing group"
                );
                let fresh = self.reindexed(&siblings);
                let left = index.checked_sub(1).map(|k| fresh[k].1);
                let right = fresh.get(index).map(|(_, rank)| *rank);
                let rank = self
                    .rank_between(left, right)
                    .unwrap_or_else(|_| bounded_midpoint(left, right));
                let changed = fresh
                    .into_iter()
                    .zip(&siblings)
                    .filter(|((_, rank), member)| rank.to_bits() != member.rank.to_bits())
                    .map(|(entry, _)| entry)
                    .collect();
                (rank, changed)
            }
        };

        Ok(Some(MovePlan {
            issue_id: id.to_string(),
            update: IssueUpdate {
                status,
                rank: Some(rank),
                ..Default::default()
            },
            reindex,
        }))
    }
}

/// Midpoint of the slot, treating open ends as the rank limits. Never
/// leaves `[left, right]`.
fn bounded_midpoint(left: Option<f64>, right: Option<f64>) -> f64 {
    let l = left.unwrap_or(-RANK_LIMIT);
    let r = right.unwrap_or(RANK_LIMIT).max(l);
    (l + (r - l) / 2.0).clamp(l, r)
}

impl Default for OrderManager {
    fn default() -> Self {
        Self::from_config(&StoreConfig::default())
    }
}
