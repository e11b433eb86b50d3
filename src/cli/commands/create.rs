//! Create command implementation.

use issue_store::NewIssue;

use crate::cli::{CreateArgs, block_on, open_remote};
use crate::config::Config;
use crate::error::Result;
use crate::format::print_json;

/// Execute the create command.
///
/// Creation is not optimistic: the issue appears once the backend has
/// assigned its id and rank.
///
/// # Errors
///
/// Returns an error if the workspace is missing or the backend rejects the
/// issue.
pub fn execute(args: CreateArgs, config: &Config, json: bool) -> Result<()> {
    let data = NewIssue {
        title: args.title,
        description: args.description,
        status: args.status,
        priority: args.priority,
        assignee: args.assignee,
        project: args.project,
        cycle: args.cycle,
        rank: None,
        labels: args.label,
    };

    let remote = open_remote(config)?;
    let issue = block_on(async { remote.create(&config.team, &data).await })??;

    if json {
        print_json(&issue)?;
    } else {
        println!("Created {}: {}", issue.id, issue.title);
    }
    Ok(())
}
