// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`FsEvent`]s and produces the list of commands the IO shell
//! (`engine::runtime::Orchestrator`) should execute. It owns the debounce
//! gate: the time of the last successful command start.
//!
//! The core has no channels, no Tokio types, and performs no IO, so the
//! filtering order and debounce rules can be tested with synthetic instants.

use std::time::{Duration, Instant};

use crate::config::WatchConfig;
use crate::engine::event_handlers::{handle_fs_event, CoreStep};
use crate::errors::Result;
use crate::watch::{ExclusionMatcher, FsEvent};

#[derive(Debug)]
pub struct CoreRuntime {
    matcher: ExclusionMatcher,
    delay: Duration,
    kill_before_respawn: bool,
    last_command_start: Option<Instant>,
}

impl CoreRuntime {
    pub fn new(matcher: ExclusionMatcher, delay: Duration, kill_before_respawn: bool) -> Self {
        Self {
            matcher,
            delay,
            kill_before_respawn,
            last_command_start: None,
        }
    }

    /// Build the core from the watch configuration and working directory.
    pub fn from_config(config: &WatchConfig, work_dir: &std::path::Path) -> Result<Self> {
        let matcher = ExclusionMatcher::new(work_dir, config.exclude())?;
        Ok(Self::new(
            matcher,
            config.delay(),
            config.kill_before_respawn(),
        ))
    }

    pub fn matcher(&self) -> &ExclusionMatcher {
        &self.matcher
    }

    pub fn last_command_start(&self) -> Option<Instant> {
        self.last_command_start
    }

    /// Record that a command instance started at `at`; opens a new debounce
    /// window.
    pub fn command_started(&mut self, at: Instant) {
        self.last_command_start = Some(at);
    }

    /// Handle a single filesystem event observed at `now`.
    pub fn step(&self, event: &FsEvent, now: Instant) -> CoreStep {
        handle_fs_event(
            &self.matcher,
            self.delay,
            self.kill_before_respawn,
            self.last_command_start,
            event,
            now,
        )
    }
}
