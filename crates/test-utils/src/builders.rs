#![allow(dead_code)]

use cng::config::{RawWatchConfig, WatchConfig};

/// Builder for `WatchConfig` to simplify test setup.
///
/// Starts from a valid configuration (separator present, command
/// `echo changed`) and goes through the same validation as the CLI.
pub struct WatchConfigBuilder {
    raw: RawWatchConfig,
}

impl WatchConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawWatchConfig {
                patterns: Vec::new(),
                exclude: Vec::new(),
                command: vec!["echo".to_string(), "changed".to_string()],
                separator: true,
                run_on_start: false,
                kill_before_respawn: false,
                verbose: false,
                delay_ms: 0,
            },
        }
    }

    pub fn watch(mut self, pattern: &str) -> Self {
        self.raw.patterns.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.raw.exclude.push(pattern.to_string());
        self
    }

    pub fn command(mut self, argv: &[&str]) -> Self {
        self.raw.command = argv.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn run_on_start(mut self, val: bool) -> Self {
        self.raw.run_on_start = val;
        self
    }

    pub fn kill(mut self, val: bool) -> Self {
        self.raw.kill_before_respawn = val;
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.raw.delay_ms = ms;
        self
    }

    pub fn raw(self) -> RawWatchConfig {
        self.raw
    }

    pub fn build(self) -> WatchConfig {
        WatchConfig::try_from(self.raw).expect("Failed to build valid config from builder")
    }
}

impl Default for WatchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
