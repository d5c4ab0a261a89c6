// src/logging.rs

//! Logging setup for `cng` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `-v/--verbose` (debug)
//! 3. `CNG_LOG` environment variable (e.g. "info", "debug")
//! 4. default to `error`, so only fatal diagnostics show up
//!
//! Logs are sent to STDERR; STDOUT belongs to the watched command.

use anyhow::Result;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>, verbose: bool) -> Result<()> {
    let level = resolve_level(cli_level, verbose, std::env::var("CNG_LOG").ok().as_deref());

    fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Pick the effective level from the flag, the verbose switch and the env var.
pub fn resolve_level(
    cli_level: Option<LogLevel>,
    verbose: bool,
    env_level: Option<&str>,
) -> tracing::Level {
    if let Some(lvl) = cli_level {
        return level_from_log_level(lvl);
    }
    if verbose {
        return tracing::Level::DEBUG;
    }
    env_level
        .and_then(parse_level_str)
        .unwrap_or(tracing::Level::ERROR)
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}
