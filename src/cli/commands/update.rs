//! Update command implementation.

use issue_store::{IssueUpdate, StoreError};

use crate::cli::{UpdateArgs, block_on, open_remote};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::format::{WriteResult, format_issue_line, print_json};
use crate::util::id::resolve_id;

/// Execute the update command.
///
/// The change is applied to the local table first and rolled back if the
/// backend rejects it.
///
/// # Errors
///
/// Returns an error if no field is given, the id does not resolve, or the
/// backend rejects the change.
pub fn execute(args: UpdateArgs, config: &Config, json: bool) -> Result<()> {
    let input = args.id.clone();
    let update = build_update(args);
    if update.is_empty() {
        return Err(AppError::validation("update", "no fields to change"));
    }
    let fields = update.changed_fields().join(", ");

    let remote = open_remote(config)?;
    let resolution = block_on(async {
        remote.load(&config.team).await?;
        let ids = remote.read().read().ids();
        let id = resolve_id(&input, &ids)?;
        let handle = remote.mutate(&id, update)?;
        Ok::<_, AppError>(handle.outcome().await?)
    })??;

    let issue_id = resolution.mutation.issue_id.clone();
    let result = WriteResult::from_resolution(resolution, 0)
        .ok_or_else(|| StoreError::not_found(issue_id))?;
    if json {
        print_json(&result)?;
    } else {
        println!("Updated {} ({fields})", result.issue.id);
        println!("{}", format_issue_line(&result.issue));
    }
    Ok(())
}

fn build_update(args: UpdateArgs) -> IssueUpdate {
    IssueUpdate {
        title: args.title,
        description: args.description.map(clearable),
        status: args.status,
        priority: args.priority,
        assignee: args.assignee.map(clearable),
        project: args.project.map(clearable),
        cycle: args.cycle.map(clearable),
        ..Default::default()
    }
}

/// An empty flag value clears the field.
fn clearable(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
