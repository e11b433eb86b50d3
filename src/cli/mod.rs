//! Command-line interface for `ib`.
//!
//! This module provides the CLI parsing and command routing using clap.

pub mod commands;

use std::future::Future;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use issue_store::{IssueFilter, IssueStore, Priority, RemoteStore, SortField, Status};

use crate::backend::JsonlBackend;
use crate::config::{CliOverrides, Config};
use crate::error::AppError;
use crate::logging::{self, LogFormat};

/// `ib` - issue board with optimistic writes and drag-and-drop ranking.
#[derive(Parser, Debug)]
#[command(name = "ib")]
#[command(
    author,
    version,
    about = "Issue board with optimistic writes and drag-and-drop ranking",
    long_about = None,
    after_help = "Data lives in .issueboard/issues.jsonl; configure with .issueboard/config.yaml or IB_* variables."
)]
pub struct Cli {
    /// Output format: text (default) or json
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Diagnostic log format on stderr
    #[arg(long, global = true, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Data file to use instead of .issueboard/issues.jsonl
    #[arg(long, global = true, value_name = "PATH")]
    pub data: Option<PathBuf>,

    /// Team key (issue id prefix)
    #[arg(long, global = true, value_name = "KEY")]
    pub team: Option<String>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize an issue board in the current directory
    Init {
        /// Overwrite an existing configuration and data file
        #[arg(long)]
        force: bool,
    },

    /// Create a new issue (ranked last in its column)
    Create(CreateArgs),

    /// Show the board, one column per status
    Board(FilterArgs),

    /// List issues
    List(ListArgs),

    /// Update fields of an issue
    Update(UpdateArgs),

    /// Move an issue to a position in a status column
    #[command(name = "move")]
    Move(MoveArgs),
}

/// Issue filters shared by `board` and `list`.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only these statuses (repeatable)
    #[arg(short, long)]
    pub status: Vec<Status>,

    /// Only these priorities: 0-4, p1, urgent, high, ... (repeatable)
    #[arg(short, long)]
    pub priority: Vec<Priority>,

    /// Only issues assigned to these people (repeatable)
    #[arg(short, long)]
    pub assignee: Vec<String>,

    /// Only this project
    #[arg(long)]
    pub project: Option<String>,

    /// Only this cycle
    #[arg(long)]
    pub cycle: Option<String>,

    /// Case-insensitive text search in title, id and description
    #[arg(long)]
    pub search: Option<String>,
}

impl FilterArgs {
    /// Convert flags into a store filter; absent flags add no constraint.
    #[must_use]
    pub fn to_filter(&self) -> IssueFilter {
        IssueFilter {
            statuses: non_empty(&self.status),
            priorities: non_empty(&self.priority),
            assignees: non_empty(&self.assignee),
            project: self.project.clone(),
            cycle: self.cycle.clone(),
            search: self.search.clone(),
        }
    }
}

fn non_empty<T: Clone>(values: &[T]) -> Option<Vec<T>> {
    (!values.is_empty()).then(|| values.to_vec())
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Sort field: manual, status, priority, assignee, project, cycle, updated, created
    #[arg(long, default_value = "manual")]
    pub sort: SortField,
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Issue title
    pub title: String,

    /// Description
    #[arg(short, long)]
    pub description: Option<String>,

    /// Initial status
    #[arg(short, long, default_value = "todo")]
    pub status: Status,

    /// Priority: 0-4, p1, urgent, high, ...
    #[arg(short, long, default_value = "0")]
    pub priority: Priority,

    #[arg(short, long)]
    pub assignee: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub cycle: Option<String>,

    /// Labels (repeatable)
    #[arg(short, long)]
    pub label: Vec<String>,
}

/// Fields to change. For `--description`, `--assignee`, `--project` and
/// `--cycle` an empty value clears the field.
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Issue id (or unique prefix of it)
    pub id: String,

    #[arg(short, long)]
    pub title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    #[arg(short, long)]
    pub status: Option<Status>,

    #[arg(short, long)]
    pub priority: Option<Priority>,

    #[arg(short, long)]
    pub assignee: Option<String>,

    #[arg(long)]
    pub project: Option<String>,

    #[arg(long)]
    pub cycle: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct MoveArgs {
    /// Issue id (or unique prefix of it)
    pub id: String,

    /// Target status column
    pub status: Status,

    /// Zero-based position in the target column (clamped to its length)
    #[arg(default_value = "0")]
    pub index: usize,
}

/// Run the CLI.
///
/// # Errors
///
/// Returns an error if the command fails to execute.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.quiet, cli.log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    let root = std::env::current_dir()?;
    let overrides = CliOverrides {
        team: cli.team,
        data: cli.data,
    };

    if let Commands::Init { force } = cli.command {
        commands::init::execute(&root, &overrides, force, cli.json)?;
        return Ok(());
    }

    let config = Config::load(&root, &overrides)?;
    match cli.command {
        Commands::Init { .. } => {}
        Commands::Create(args) => commands::create::execute(args, &config, cli.json)?,
        Commands::Board(args) => commands::board::execute(&args, &config, cli.json)?,
        Commands::List(args) => commands::list::execute(&args, &config, cli.json)?,
        Commands::Update(args) => commands::update::execute(args, &config, cli.json)?,
        Commands::Move(args) => commands::move_issue::execute(&args, &config, cli.json)?,
    }

    Ok(())
}

/// Drive `fut` to completion on a single-threaded runtime with a `LocalSet`,
/// which the remote driver needs for its write tasks.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn block_on<F: Future>(fut: F) -> crate::error::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    Ok(tokio::task::LocalSet::new().block_on(&runtime, fut))
}

/// Store bound to the configured data file.
///
/// # Errors
///
/// Returns `NotInitialized` if the data file does not exist, or a config
/// error if the store settings are invalid.
pub fn open_remote(config: &Config) -> crate::error::Result<RemoteStore<JsonlBackend>> {
    if !config.data_file.exists() {
        return Err(AppError::NotInitialized {
            path: config.data_file.clone(),
        });
    }
    let store = IssueStore::new(config.store.clone())?;
    let backend = JsonlBackend::new(&config.data_file, &config.store);
    Ok(RemoteStore::new(store, backend))
}
