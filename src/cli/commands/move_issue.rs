//! Move command implementation.
//!
//! Places an issue at a position in a status column. A move may first
//! rewrite the ranks of the target column when neighbouring ranks have run
//! out of precision; those writes are reported alongside the move.

use issue_store::{Resolution, StoreError};
use serde_json::json;

use crate::cli::{MoveArgs, block_on, open_remote};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::format::{WriteResult, format_issue_line, print_json};
use crate::util::id::resolve_id;

enum MoveOutcome {
    Unchanged(String),
    Moved {
        resolution: Resolution,
        reindexed: usize,
    },
}

/// Execute the move command.
///
/// # Errors
///
/// Returns an error if the id does not resolve or any write of the move is
/// rejected. Rejected writes are rolled back.
pub fn execute(args: &MoveArgs, config: &Config, json: bool) -> Result<()> {
    let remote = open_remote(config)?;
    let outcome = block_on(async {
        remote.load(&config.team).await?;
        let ids = remote.read().read().ids();
        let id = resolve_id(&args.id, &ids)?;
        let Some(handle) = remote.move_issue(&id, &args.status, args.index)? else {
            return Ok::<_, AppError>(MoveOutcome::Unchanged(id));
        };
        let reindexed = handle.reindex.len();
        let resolution = handle.outcome().await?;
        Ok(MoveOutcome::Moved {
            resolution,
            reindexed,
        })
    })??;

    match outcome {
        MoveOutcome::Unchanged(id) => {
            if json {
                print_json(&json!({ "id": id, "moved": false }))?;
            } else {
                println!("{id} is already at that position");
            }
        }
        MoveOutcome::Moved {
            resolution,
            reindexed,
        } => {
            let issue_id = resolution.mutation.issue_id.clone();
            let result = WriteResult::from_resolution(resolution, reindexed)
                .ok_or_else(|| StoreError::not_found(issue_id))?;
            if json {
                print_json(&result)?;
            } else {
                println!("Moved {} to {}", result.issue.id, result.issue.status);
                if reindexed > 0 {
                    println!("Re-indexed {reindexed} sibling(s)");
                }
                println!("{}", format_issue_line(&result.issue));
            }
        }
    }
    Ok(())
}
