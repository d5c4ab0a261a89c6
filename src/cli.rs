// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Usage: `cng [flags] path-pattern... -- command args...`
//!
//! Everything after the `--` separator is the command to run; clap hands it
//! to us untouched (`last = true`), so flags meant for the command are never
//! interpreted as ours.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};

/// Command-line arguments for `cng`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cng",
    version,
    about = "Runs a command when file changes are detected.",
    override_usage = "cng [flags] [paths] -- [command]",
    long_about = None
)]
pub struct CliArgs {
    /// Execute command for initially added paths (reserved, currently a no-op).
    #[arg(short = 'a', long)]
    pub add: bool,

    /// Execute command once on load without any event.
    #[arg(short = 'i', long)]
    pub initial: bool,

    /// Exclude matching paths (glob, repeatable).
    #[arg(short = 'e', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,

    /// Kill running processes between changes.
    #[arg(short = 'k', long)]
    pub kill: bool,

    /// Delay between process changes in milliseconds.
    #[arg(short = 'd', long, value_name = "MS")]
    pub delay: Option<u64>,

    /// Enable verbose logging.
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Optional TOML file with project defaults (exclude, delay, kill, ...).
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// Takes precedence over `--verbose` and `CNG_LOG`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Glob patterns of paths to watch.
    #[arg(value_name = "PATHS")]
    pub patterns: Vec<String>,

    /// Command (and its arguments) to run after the `--` separator.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,

    /// Whether a literal `--` appeared on the command line.
    #[arg(skip)]
    pub separator: bool,
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

/// Parse the process arguments.
pub fn parse() -> CliArgs {
    parse_from(std::env::args_os())
}

/// Parse from an explicit argument list (first item is the binary name).
pub fn parse_from<I, T>(itr: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let raw: Vec<OsString> = itr.into_iter().map(Into::into).collect();
    let mut args = CliArgs::parse_from(raw.iter().cloned());
    args.separator = raw.iter().skip(1).any(|a| a.as_os_str() == "--");
    args
}

/// Print `msg`, a blank line and the help text, then exit with status 1.
pub fn usage_failure(msg: &str) -> ! {
    println!("{msg}");
    println!();
    let _ = CliArgs::command().print_help();
    std::process::exit(1);
}
