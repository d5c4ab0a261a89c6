use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use cng::errors::{CngError, Result};
use cng::watch::{FsEvent, NotifySource};
use tokio::sync::mpsc;

/// What the orchestrator asked of the source, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Add(PathBuf),
    Remove(PathBuf),
    Close,
}

/// A notification source that never touches the OS.
///
/// - records `add`/`remove`/`close` calls into a shared log
/// - events are injected through the sender returned by [`FakeSource::new`]
/// - paths listed in `fail_on` make `add` fail, to exercise fatal
///   registration errors
/// - paths listed in `vanish_on` are deleted from disk when `add` is called
///   and then rejected, like a directory removed mid-walk
pub struct FakeSource {
    calls: Arc<Mutex<Vec<SourceCall>>>,
    fail_on: Vec<PathBuf>,
    vanish_on: Vec<PathBuf>,
}

impl FakeSource {
    /// Returns the source, a sender to inject events, and the receiver to
    /// hand to the orchestrator.
    pub fn new() -> (
        Self,
        mpsc::UnboundedSender<FsEvent>,
        mpsc::UnboundedReceiver<FsEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_on: Vec::new(),
            vanish_on: Vec::new(),
        };
        (source, tx, rx)
    }

    /// Make `add(path)` fail.
    pub fn failing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.fail_on.push(path.into());
        self
    }

    /// Delete `path` from disk when it is added, then fail the add.
    pub fn vanishing_on(mut self, path: impl Into<PathBuf>) -> Self {
        self.vanish_on.push(path.into());
        self
    }

    /// Shared handle on the call log; stays valid after the source is moved.
    pub fn calls(&self) -> Arc<Mutex<Vec<SourceCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: SourceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl NotifySource for FakeSource {
    fn add(&mut self, path: &Path) -> Result<()> {
        if self.vanish_on.iter().any(|p| p == path) {
            let _ = std::fs::remove_dir_all(path);
            return Err(CngError::WatchSetup(format!(
                "fake source lost {}",
                path.display()
            )));
        }
        if self.fail_on.iter().any(|p| p == path) {
            return Err(CngError::WatchSetup(format!(
                "fake source refuses {}",
                path.display()
            )));
        }
        self.record(SourceCall::Add(path.to_path_buf()));
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.record(SourceCall::Remove(path.to_path_buf()));
        Ok(())
    }

    fn close(&mut self) {
        self.record(SourceCall::Close);
    }
}

/// Paths passed to `add`, in order.
pub fn added_paths(calls: &Arc<Mutex<Vec<SourceCall>>>) -> Vec<PathBuf> {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter_map(|c| match c {
            SourceCall::Add(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}
