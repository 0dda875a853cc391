// src/logging.rs

//! Logging setup for `batchfleet` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `BATCHFLEET_LOG` environment variable, either a bare level ("debug")
//!    or full directives ("batchfleet::batch=trace,info")
//! 3. default to `info`
//!
//! Logs are sent to STDERR; stdout is reserved for the dry-run summary.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable consulted when no CLI level is given.
pub const LOG_ENV_VAR: &str = "BATCHFLEET_LOG";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))
}

/// Resolve the filter from the CLI flag and the raw env value.
///
/// Invalid env directives fall back to `info`.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(level_str(lvl));
    }

    env_value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| EnvFilter::try_new(s.to_lowercase()).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn level_str(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
