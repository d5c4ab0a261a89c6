// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::watch::{ExclusionMatcher, FsEvent, FsOp};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// A path was created: register it (and its subtree if it is a directory).
    RegisterCreated(PathBuf),
    /// Kill the recorded command instance and wait for it to be reaped.
    KillCurrent,
    /// Start a new command instance.
    Spawn,
}

/// Why an event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Matched a default ignore or a user exclude pattern.
    Excluded,
    /// Permission/attribute change only.
    Chmod,
    /// Arrived inside the debounce window of the last command start.
    Debounced,
}

/// Decision returned by the core after handling a single [`FsEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Set when the event was discarded; `commands` is then empty.
    pub skipped: Option<SkipReason>,
}

impl CoreStep {
    fn skip(reason: SkipReason) -> Self {
        Self {
            commands: Vec::new(),
            skipped: Some(reason),
        }
    }
}

/// Handle a filesystem event.
///
/// Checks run in a fixed order and the first one that fires drops the event:
/// 1. exclusion (default ignores, then user patterns)
/// 2. pure permission change
/// 3. debounce window, measured from `last_start`
///
/// An accepted event yields, in order: registration of a created path, a kill
/// of the current instance when `kill_before_respawn` is set, and a spawn.
/// Dropped events are not remembered anywhere.
pub fn handle_fs_event(
    matcher: &ExclusionMatcher,
    delay: Duration,
    kill_before_respawn: bool,
    last_start: Option<Instant>,
    event: &FsEvent,
    now: Instant,
) -> CoreStep {
    if matcher.should_exclude(&event.path) {
        return CoreStep::skip(SkipReason::Excluded);
    }

    if event.op == FsOp::Chmod {
        return CoreStep::skip(SkipReason::Chmod);
    }

    if let Some(last) = last_start {
        if now.saturating_duration_since(last) < delay {
            return CoreStep::skip(SkipReason::Debounced);
        }
    }

    let mut commands = Vec::with_capacity(3);
    if event.op == FsOp::Create {
        commands.push(CoreCommand::RegisterCreated(event.path.clone()));
    }
    if kill_before_respawn {
        commands.push(CoreCommand::KillCurrent);
    }
    commands.push(CoreCommand::Spawn);

    CoreStep {
        commands,
        skipped: None,
    }
}
