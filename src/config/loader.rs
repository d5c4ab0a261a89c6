// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::model::{ProjectFile, RawWatchConfig, WatchConfig};
use crate::errors::Result;

/// Load a project file from a given path.
///
/// This only performs TOML deserialization; merging with the CLI and
/// validation happen in [`load_and_validate`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ProjectFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let file: ProjectFile = toml::from_str(&contents)?;

    Ok(file)
}

/// Build the validated [`WatchConfig`] for this invocation.
///
/// - Uses `--config` when given; otherwise picks up `.cng.toml` in
///   `work_dir` if it exists.
/// - Merges the project file into the CLI arguments.
/// - Enforces the startup invariants (patterns, separator, command, globs).
pub fn load_and_validate(args: &CliArgs, work_dir: &Path) -> Result<WatchConfig> {
    let project = match &args.config {
        Some(path) => Some(load_from_path(path)?),
        None => {
            let candidate = default_config_path(work_dir);
            if candidate.is_file() {
                debug!(path = ?candidate, "using project file");
                Some(load_from_path(&candidate)?)
            } else {
                None
            }
        }
    };

    let raw = RawWatchConfig::from_cli(args, project.as_ref());
    WatchConfig::try_from(raw)
}

/// Project file looked up in the working directory when `--config` is absent.
pub fn default_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(".cng.toml")
}

impl RawWatchConfig {
    /// Merge CLI arguments with an optional project file.
    ///
    /// Booleans are OR-ed, excludes are concatenated (CLI first), and the CLI
    /// delay wins over the file's.
    pub fn from_cli(args: &CliArgs, project: Option<&ProjectFile>) -> Self {
        let mut exclude = args.exclude.clone();
        let mut delay_ms = args.delay;
        let mut raw = Self {
            patterns: args.patterns.clone(),
            exclude: Vec::new(),
            command: args.command.clone(),
            separator: args.separator,
            run_on_start: args.initial,
            kill_before_respawn: args.kill,
            verbose: args.verbose,
            delay_ms: 0,
        };

        if let Some(file) = project {
            exclude.extend(file.exclude.iter().cloned());
            delay_ms = delay_ms.or(file.delay);
            raw.run_on_start |= file.initial;
            raw.kill_before_respawn |= file.kill;
            raw.verbose |= file.verbose;
        }

        raw.exclude = exclude;
        raw.delay_ms = delay_ms.unwrap_or(0);
        raw
    }
}
