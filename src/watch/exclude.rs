// src/watch/exclude.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{CngError, Result};
use crate::watch::path_utils::{anchor, to_slash};

/// Directory names that are always ignored, whatever the user configured.
pub const DEFAULT_IGNORES: &[&str] = &[".git", "node_modules"];

/// Decides whether an event path should be skipped.
///
/// Built once from the working directory and the user's exclude patterns.
/// Relative patterns are anchored to the working directory, so with a working
/// directory of `/foo` the pattern `*.txt` becomes `/foo/*.txt` and does not
/// match `/foo2/a.txt` or `/foo/sub/a.txt`.
///
/// Pattern syntax: `**` spans zero or more path segments, `*` stays inside a
/// segment, `{a,b}` is alternation.
#[derive(Clone)]
pub struct ExclusionMatcher {
    work_dir: PathBuf,
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl fmt::Debug for ExclusionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExclusionMatcher")
            .field("work_dir", &self.work_dir)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExclusionMatcher {
    pub fn new(work_dir: impl Into<PathBuf>, patterns: &[String]) -> Result<Self> {
        let work_dir = work_dir.into();

        let anchored: Vec<String> = patterns
            .iter()
            .map(|p| to_slash(&anchor(p, &work_dir)))
            .collect();

        let set = if anchored.is_empty() {
            None
        } else {
            Some(build_globset(&anchored).map_err(|e| CngError::WatchSetup(format!("{e:#}")))?)
        };

        Ok(Self {
            work_dir,
            patterns: anchored,
            set,
        })
    }

    /// Anchored exclude patterns, in configuration order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True if `path` lies in a default-ignored directory or matches any
    /// user exclude pattern.
    pub fn should_exclude(&self, path: &Path) -> bool {
        if is_default_ignored(path) {
            return true;
        }

        let Some(set) = &self.set else {
            return false;
        };

        let candidate = to_slash(&anchor(path, &self.work_dir));
        set.is_match(candidate.as_str())
    }
}

/// True if any segment of `path` is one of [`DEFAULT_IGNORES`].
pub fn is_default_ignored(path: &Path) -> bool {
    path.components().any(|c| match c {
        Component::Normal(name) => DEFAULT_IGNORES.iter().any(|ignore| name == *ignore),
        _ => false,
    })
}

/// Build a GlobSet where `*` does not cross `/`.
fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid exclude pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
