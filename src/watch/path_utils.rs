// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};

/// Characters that turn a path segment into a glob segment.
const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Lexically normalise a path: drop `.` segments and fold `..` into the
/// preceding segment. The filesystem is never consulted, so symlinks are not
/// resolved.
pub fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Anchor `pattern` to `work_dir` when it is relative, then normalise it.
///
/// Absolute patterns are kept as they are, so `/foo/*.txt` never turns into
/// `<work_dir>/foo/*.txt`.
pub fn anchor(pattern: impl AsRef<Path>, work_dir: &Path) -> PathBuf {
    let pattern = pattern.as_ref();
    if pattern.is_absolute() {
        clean(pattern)
    } else {
        clean(&work_dir.join(pattern))
    }
}

/// Whether a single path segment contains glob syntax.
pub fn is_glob_segment(segment: &str) -> bool {
    segment.contains(GLOB_META)
}

/// Render a path with forward slashes, the form the glob matchers expect.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
