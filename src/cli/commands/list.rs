//! List command implementation.

use issue_store::ViewMode;

use crate::cli::{ListArgs, block_on, open_remote};
use crate::config::Config;
use crate::error::Result;
use crate::format::{format_issue_line, print_json};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the workspace is missing or the data file cannot be
/// read.
pub fn execute(args: &ListArgs, config: &Config, json: bool) -> Result<()> {
    let remote = open_remote(config)?;
    block_on(async { remote.load(&config.team).await })??;

    let issues = {
        let mut store = remote.store_mut();
        store.set_filter(args.filters.to_filter());
        store.set_view(ViewMode::List(args.sort));
        store.view()
    };

    if json {
        print_json(&issues)?;
    } else if issues.is_empty() {
        println!("No issues found.");
    } else {
        for issue in &issues {
            println!("{}", format_issue_line(issue));
        }
        println!("\n{} issue(s)", issues.len());
    }
    Ok(())
}
