//! Board command implementation.

use issue_store::ViewMode;

use crate::cli::{FilterArgs, block_on, open_remote};
use crate::config::Config;
use crate::error::Result;
use crate::format::{format_board, print_json};

/// Execute the board command.
///
/// # Errors
///
/// Returns an error if the workspace is missing or the data file cannot be
/// read.
pub fn execute(args: &FilterArgs, config: &Config, json: bool) -> Result<()> {
    let remote = open_remote(config)?;
    block_on(async { remote.load(&config.team).await })??;

    let columns = {
        let mut store = remote.store_mut();
        store.set_filter(args.to_filter());
        store.set_view(ViewMode::Board);
        store.board()
    };

    if json {
        print_json(&columns)?;
    } else if columns.iter().all(|column| column.issues.is_empty()) {
        println!("No issues found.");
    } else {
        print!("{}", format_board(&columns));
    }
    Ok(())
}
