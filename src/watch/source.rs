// src/watch/source.rs

//! Filesystem notification source.
//!
//! The orchestrator only sees the [`NotifySource`] trait and a stream of
//! [`FsEvent`]s. Production uses [`NotifyWatcherSource`], a thin wrapper over
//! `notify::RecommendedWatcher` where every path is watched non-recursively;
//! recursion is the tree registrar's job.

use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::errors::{CngError, Result};

/// What happened to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsOp {
    Create,
    Write,
    Remove,
    Rename,
    /// Permission or attribute change only.
    Chmod,
}

/// A single raw change reported by the notification source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub path: PathBuf,
    pub op: FsOp,
}

impl FsEvent {
    pub fn new(path: impl Into<PathBuf>, op: FsOp) -> Self {
        Self {
            path: path.into(),
            op,
        }
    }
}

/// Registration side of a notification source.
///
/// Events for registered paths are delivered on the receiver handed out when
/// the source is created. A registered directory reports events for its
/// direct children.
pub trait NotifySource: Send {
    /// Start watching `path`.
    fn add(&mut self, path: &Path) -> Result<()>;

    /// Stop watching `path`.
    fn remove(&mut self, path: &Path) -> Result<()>;

    /// Stop all watching. Further `add`/`remove` calls fail.
    fn close(&mut self);
}

/// Notification source backed by the platform's native watcher.
pub struct NotifyWatcherSource {
    inner: Option<RecommendedWatcher>,
}

impl fmt::Debug for NotifyWatcherSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyWatcherSource")
            .field("open", &self.inner.is_some())
            .finish()
    }
}

impl NotifyWatcherSource {
    /// Create the watcher and the channel its events are forwarded on.
    pub fn new() -> Result<(Self, mpsc::UnboundedReceiver<FsEvent>)> {
        // Channel from the blocking notify callback into the async world.
        let (event_tx, event_rx) = mpsc::unbounded_channel::<FsEvent>();

        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for fs_event in translate(&event) {
                        if event_tx.send(fs_event).is_err() {
                            // Receiver gone: the orchestrator has shut down.
                            return;
                        }
                    }
                }
                Err(err) => {
                    // We can't log via tracing here easily, so fallback to stderr.
                    eprintln!("cng: file watch error: {err}");
                }
            },
            Config::default(),
        )
        .map_err(|e| CngError::WatchSetup(format!("Could not start file watcher: {e}")))?;

        Ok((
            Self {
                inner: Some(watcher),
            },
            event_rx,
        ))
    }

    fn watcher(&mut self) -> Result<&mut RecommendedWatcher> {
        self.inner
            .as_mut()
            .ok_or_else(|| CngError::WatchSetup("notification source is closed".to_string()))
    }
}

impl NotifySource for NotifyWatcherSource {
    fn add(&mut self, path: &Path) -> Result<()> {
        self.watcher()?.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.watcher()?.unwatch(path)?;
        Ok(())
    }

    fn close(&mut self) {
        // Dropping the watcher stops the backend thread and its callbacks.
        self.inner.take();
    }
}

/// Map a `notify` event onto zero or more [`FsEvent`]s, one per path.
///
/// The destination side of a rename is reported as [`FsOp::Create`]: a
/// directory moved into the tree must be registered like a new one. Access
/// events and kinds notify cannot classify carry no change and are dropped.
pub fn translate(event: &Event) -> Vec<FsEvent> {
    let op = match event.kind {
        EventKind::Create(_) => FsOp::Create,
        EventKind::Modify(ModifyKind::Metadata(_)) => FsOp::Chmod,
        EventKind::Modify(ModifyKind::Name(mode)) => return translate_rename(mode, &event.paths),
        EventKind::Modify(_) => FsOp::Write,
        EventKind::Remove(_) => FsOp::Remove,
        EventKind::Access(_) | EventKind::Any | EventKind::Other => return Vec::new(),
    };

    event
        .paths
        .iter()
        .map(|path| FsEvent::new(path.clone(), op))
        .collect()
}

fn translate_rename(mode: RenameMode, paths: &[PathBuf]) -> Vec<FsEvent> {
    match mode {
        RenameMode::From => paths
            .iter()
            .map(|p| FsEvent::new(p.clone(), FsOp::Rename))
            .collect(),
        // `[from, to]`
        RenameMode::Both => paths
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let op = if i == 0 { FsOp::Rename } else { FsOp::Create };
                FsEvent::new(p.clone(), op)
            })
            .collect(),
        // Backends that cannot tell the two sides apart (e.g. FSEvents) report
        // `Any`; treating it as a creation only costs a stat of a gone path.
        RenameMode::To | RenameMode::Any | RenameMode::Other => paths
            .iter()
            .map(|p| FsEvent::new(p.clone(), FsOp::Create))
            .collect(),
    }
}
