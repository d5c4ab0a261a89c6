// src/watch/mod.rs

//! File watching.
//!
//! This module is responsible for:
//! - Deciding which event paths are excluded (`exclude`).
//! - Expanding watch patterns into root directories and matches (`resolver`).
//! - Keeping the set of registered directories in step with the tree
//!   (`registrar`).
//! - Wiring up a cross-platform filesystem watcher (`source`, via `notify`).
//!
//! It does **not** know about processes; the engine decides what an event
//! leads to.

pub mod exclude;
pub mod path_utils;
pub mod registrar;
pub mod resolver;
pub mod source;

pub use exclude::{is_default_ignored, ExclusionMatcher, DEFAULT_IGNORES};
pub use registrar::TreeRegistrar;
pub use resolver::{resolve, split_pattern, ResolvedPattern};
pub use source::{translate, FsEvent, FsOp, NotifySource, NotifyWatcherSource};
