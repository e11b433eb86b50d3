//! Store tuning knobs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Distance between neighbouring ranks after a re-index, and the step used
/// when placing at either end of a group.
pub const DEFAULT_RANK_SPACING: f64 = 1024.0;

/// Below this gap two neighbouring ranks are treated as indistinguishable.
pub const DEFAULT_MIN_RANK_GAP: f64 = 1e-9;

/// Largest accepted `rank_spacing`. Leaves room for about a million
/// evenly spaced ranks before `RANK_LIMIT`.
pub const MAX_RANK_SPACING: f64 = crate::order::RANK_LIMIT / 1_048_576.0;

pub const DEFAULT_REMOTE_TIMEOUT_MS: u64 = 10_000;

/// Configuration for an [`IssueStore`](crate::store::IssueStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub rank_spacing: f64,
    pub min_rank_gap: f64,
    pub remote_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            rank_spacing: DEFAULT_RANK_SPACING,
            min_rank_gap: DEFAULT_MIN_RANK_GAP,
            remote_timeout_ms: DEFAULT_REMOTE_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    /// Check that placement can always make progress after a re-index.
    ///
    /// # Errors
    ///
    /// Returns `Config` if the spacing or gap are non-finite, non-positive,
    /// too close together, or the spacing exceeds `MAX_RANK_SPACING`; or if
    /// the timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if !self.min_rank_gap.is_finite() || self.min_rank_gap <= 0.0 {
            return Err(StoreError::Config(format!(
                "min_rank_gap must be a positive number, got {}",
                self.min_rank_gap
            )));
        }
        if !self.rank_spacing.is_finite() || self.rank_spacing < self.min_rank_gap * 4.0 {
            return Err(StoreError::Config(format!(
                "rank_spacing must be at least 4 x min_rank_gap, got {}",
                self.rank_spacing
            )));
        }
        if self.rank_spacing > MAX_RANK_SPACING {
            return Err(StoreError::Config(format!(
                "rank_spacing must be at most {MAX_RANK_SPACING}, got {}",
                self.rank_spacing
            )));
        }
        if self.remote_timeout_ms == 0 {
            return Err(StoreError::Config(
                "remote_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub const fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote_timeout_ms)
    }
}
