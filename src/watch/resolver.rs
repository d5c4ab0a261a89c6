// src/watch/resolver.rs

//! Expansion of watch patterns into root directories and matched paths.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use tracing::debug;
use walkdir::WalkDir;

use crate::errors::{CngError, Result};
use crate::watch::path_utils::{anchor, is_glob_segment, to_slash};

/// Outcome of resolving one watch pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPattern {
    /// The pattern after anchoring to the working directory.
    pub pattern: PathBuf,
    /// Longest literal directory prefix; always registered with the
    /// notification source, even when nothing matches yet.
    pub root: PathBuf,
    /// Paths currently matching the pattern, sorted.
    pub matches: Vec<PathBuf>,
}

/// Split an anchored pattern into its literal root and the glob remainder.
///
/// `/w/src/**/*.rs` gives (`/w/src`, `Some("**/*.rs")`). A pattern without any
/// glob syntax is split at its last separator, like a plain file path:
/// `/w/src/main.rs` gives (`/w/src`, `None`).
pub fn split_pattern(anchored: &Path) -> (PathBuf, Option<String>) {
    let mut root = PathBuf::new();
    let mut rest: Vec<String> = Vec::new();

    for comp in anchored.components() {
        let glob_started = !rest.is_empty();
        match comp {
            Component::Normal(seg) if glob_started || is_glob_segment(&seg.to_string_lossy()) => {
                rest.push(seg.to_string_lossy().into_owned());
            }
            other => root.push(other.as_os_str()),
        }
    }

    if rest.is_empty() {
        let parent = anchored
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| anchored.to_path_buf());
        return (parent, None);
    }

    (root, Some(rest.join("/")))
}

/// Resolve `pattern` against `work_dir`.
///
/// Relative patterns are anchored to `work_dir`. The anchored pattern is then
/// expanded against the current filesystem by walking the literal root; `**`
/// allows an unbounded walk, otherwise the walk stops at the pattern's depth.
///
/// A pattern that is not valid glob syntax is a [`CngError::WatchSetup`].
pub fn resolve(pattern: &str, work_dir: &Path) -> Result<ResolvedPattern> {
    let anchored = anchor(pattern, work_dir);
    let (root, rest) = split_pattern(&anchored);

    // A literal directory is its own root.
    let root = if rest.is_none() && anchored.is_dir() {
        anchored.clone()
    } else {
        root
    };

    let matches = match rest {
        None => {
            if anchored.exists() {
                vec![anchored.clone()]
            } else {
                Vec::new()
            }
        }
        Some(rest) => expand(&anchored, &root, &rest)?,
    };

    debug!(pattern, root = ?root, count = matches.len(), "resolved watch pattern");

    Ok(ResolvedPattern {
        pattern: anchored,
        root,
        matches,
    })
}

fn expand(anchored: &Path, root: &Path, rest: &str) -> Result<Vec<PathBuf>> {
    let glob_str = to_slash(anchored);
    let matcher = GlobBuilder::new(&glob_str)
        .literal_separator(true)
        .build()
        .map_err(|e| CngError::WatchSetup(format!("Could not expand glob pattern {glob_str}: {e}")))?
        .compile_matcher();

    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut walker = WalkDir::new(root).min_depth(1).follow_links(false);
    if !rest.contains("**") {
        walker = walker.max_depth(rest.split('/').count());
    }

    let mut matches = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                debug!(error = %err, "skipping unreadable entry during glob expansion");
                continue;
            }
        };
        if matcher.is_match(to_slash(entry.path()).as_str()) {
            matches.push(entry.into_path());
        }
    }

    matches.sort();
    Ok(matches)
}
