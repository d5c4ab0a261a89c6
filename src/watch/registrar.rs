// src/watch/registrar.rs

//! Recursive registration of directories with the notification source.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{CngError, Result};
use crate::watch::source::NotifySource;

/// Owns the watch set: every path currently registered with the
/// notification source.
///
/// The set only grows. Deleted paths stay registered; the notification source
/// stops reporting on them by itself. Registering a path twice is a no-op, so
/// each filesystem operation is delivered at most once.
#[derive(Debug, Default)]
pub struct TreeRegistrar {
    watch_set: BTreeSet<PathBuf>,
}

impl TreeRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.watch_set.contains(path)
    }

    pub fn len(&self) -> usize {
        self.watch_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watch_set.is_empty()
    }

    /// Registered paths, sorted.
    pub fn watch_list(&self) -> Vec<PathBuf> {
        self.watch_set.iter().cloned().collect()
    }

    /// Register a single path. Returns `false` if it was already registered.
    pub fn register_path(&mut self, source: &mut dyn NotifySource, path: &Path) -> Result<bool> {
        if self.watch_set.contains(path) {
            return Ok(false);
        }

        source.add(path).map_err(|e| {
            CngError::WatchSetup(format!("Could not watch path {}: {e}", path.display()))
        })?;

        debug!(path = ?path, "watching");
        self.watch_set.insert(path.to_path_buf());
        Ok(true)
    }

    /// Like [`register_path`](Self::register_path), but a path that no longer
    /// exists when the source rejects it is skipped instead of failing.
    ///
    /// Paths discovered at runtime can be deleted between being seen and
    /// being registered; only a failure on a path that is still there is
    /// fatal.
    pub fn register_if_present(
        &mut self,
        source: &mut dyn NotifySource,
        path: &Path,
    ) -> Result<bool> {
        if self.watch_set.contains(path) {
            return Ok(false);
        }

        match source.add(path) {
            Ok(()) => {
                debug!(path = ?path, "watching");
                self.watch_set.insert(path.to_path_buf());
                Ok(true)
            }
            Err(err) if !path.exists() => {
                debug!(path = ?path, error = %err, "path vanished before it could be watched");
                Ok(false)
            }
            Err(err) => Err(CngError::WatchSetup(format!(
                "Could not watch path {}: {err}",
                path.display()
            ))),
        }
    }

    /// Register `root` and every directory below it.
    ///
    /// Files are not registered: events for them are reported through their
    /// directory. Entries that vanish while walking or before they are
    /// registered are skipped; any other failure is fatal.
    ///
    /// Returns the number of newly registered directories.
    pub fn register_tree(&mut self, source: &mut dyn NotifySource, root: &Path) -> Result<usize> {
        debug!(path = ?root, "adding directory tree to watcher");

        let mut added = 0;
        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if vanished(&err) => {
                    debug!(error = %err, "entry vanished while walking");
                    continue;
                }
                Err(err) => {
                    return Err(CngError::WatchSetup(format!(
                        "Error walking the path {}: {err}",
                        root.display()
                    )));
                }
            };

            if entry.file_type().is_dir() && self.register_if_present(source, entry.path())? {
                added += 1;
            }
        }

        Ok(added)
    }
}

fn vanished(err: &walkdir::Error) -> bool {
    err.io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound)
}
