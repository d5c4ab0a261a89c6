// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

/// Optional project file given with `--config`.
///
/// ```toml
/// exclude = ["dist/**", "*.log"]
/// delay = 250
/// kill = true
/// ```
///
/// Every key is optional. Values are merged into the CLI arguments by
/// [`RawWatchConfig::from_cli`](crate::config::RawWatchConfig::from_cli).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFile {
    /// Extra exclude patterns, appended after `-e` patterns.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Debounce window in milliseconds; `-d` wins when both are set.
    #[serde(default)]
    pub delay: Option<u64>,

    #[serde(default)]
    pub kill: bool,

    #[serde(default)]
    pub initial: bool,

    #[serde(default)]
    pub verbose: bool,
}

/// Unvalidated settings as collected from the CLI (and project file).
///
/// Convert into a [`WatchConfig`] with `WatchConfig::try_from`, which enforces
/// the invariants the orchestrator relies on.
#[derive(Debug, Clone, Default)]
pub struct RawWatchConfig {
    pub patterns: Vec<String>,
    pub exclude: Vec<String>,
    pub command: Vec<String>,
    /// Whether the `--` separator was present.
    pub separator: bool,
    pub run_on_start: bool,
    pub kill_before_respawn: bool,
    pub verbose: bool,
    pub delay_ms: u64,
}

/// Immutable watch configuration, supplied once at startup.
///
/// Invariants (checked on construction):
/// - `patterns` is not empty
/// - `command` is not empty
/// - every pattern compiles as a glob
#[derive(Debug, Clone)]
pub struct WatchConfig {
    patterns: Vec<String>,
    exclude: Vec<String>,
    command: Vec<String>,
    run_on_start: bool,
    kill_before_respawn: bool,
    verbose: bool,
    delay: Duration,
}

impl WatchConfig {
    /// Construct without validation; `TryFrom<RawWatchConfig>` is the checked path.
    pub(crate) fn new_unchecked(raw: RawWatchConfig) -> Self {
        Self {
            patterns: raw.patterns,
            exclude: raw.exclude,
            command: raw.command,
            run_on_start: raw.run_on_start,
            kill_before_respawn: raw.kill_before_respawn,
            verbose: raw.verbose,
            delay: Duration::from_millis(raw.delay_ms),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Program followed by its arguments; never empty.
    pub fn command(&self) -> &[String] {
        &self.command
    }

    pub fn run_on_start(&self) -> bool {
        self.run_on_start
    }

    pub fn kill_before_respawn(&self) -> bool {
        self.kill_before_respawn
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    /// Debounce window measured from the last command start.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Short human-readable rendering of the command, for logs.
    pub fn command_line(&self) -> String {
        self.command.join(" ")
    }
}
