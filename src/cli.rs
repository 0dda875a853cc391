// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `batchfleet`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "batchfleet",
    version,
    about = "Allocate a node fleet to ranked targets and dispatch timed weaken/grow/hack batches.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Batchfleet.toml` in the current working directory. A
    /// missing file at the default path means built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Batchfleet.toml")]
    pub config: String,

    /// Path to the world description the simulated substrate runs against.
    #[arg(long, value_name = "PATH")]
    pub world: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BATCHFLEET_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Discover, rank and allocate once, print the result, dispatch nothing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
