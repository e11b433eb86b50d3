use issue_store::{Issue, Resolution};
use serde::Serialize;

/// Result of a write command (`update`, `move`) for JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct WriteResult {
    #[serde(flatten)]
    pub issue: Issue,
    /// Mutation id the write was tracked under.
    pub mutation: u64,
    /// Sibling ranks rewritten by a re-index (moves only).
    #[serde(skip_serializing_if = "is_zero")]
    pub reindexed: usize,
}

impl WriteResult {
    /// Build from a committed resolution. `None` if the issue disappeared.
    #[must_use]
    pub fn from_resolution(resolution: Resolution, reindexed: usize) -> Option<Self> {
        Some(Self {
            mutation: resolution.mutation.id,
            issue: resolution.issue?,
            reindexed,
        })
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(n: &usize) -> bool {
    *n == 0
}
