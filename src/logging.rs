//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Diagnostics always go to stderr so `--json` output on stdout stays
//! machine-readable. `RUST_LOG` overrides the verbosity flags.
//!
//! # Log Levels
//!
//! - `warn` (default): rolled-back writes, non-fatal problems
//! - `info` (`-v`): loads, re-indexes
//! - `debug` (`-vv`): every optimistic apply and commit
//! - `trace` (`-vvv`)

use std::io;

use tracing::Level;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact single-line format.
    #[default]
    Compact,
    /// JSON format for machine parsing.
    Json,
}

/// Map `-v` count and `--quiet` to a level.
#[must_use]
pub const fn level_for(verbose: u8, quiet: bool) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn build_env_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()))
}

/// Initialize the global subscriber, writing to stderr.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(verbose: u8, quiet: bool, format: Option<LogFormat>) -> Result<(), String> {
    init_logging_with_writer(level_for(verbose, quiet), format.unwrap_or_default(), io::stderr)
}

/// Initialize logging with a custom writer (useful for testing).
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging_with_writer<W>(level: Level, format: LogFormat, writer: W) -> Result<(), String>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = build_env_filter(level);
    let result = match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer).with_target(true))
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .compact()
                    .with_writer(writer)
                    .with_target(false)
                    .without_time(),
            )
            .try_init(),
    };
    result.map_err(|e| e.to_string())
}
