// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`supervisor`] owns the command's lifecycle behind the
//!   [`ProcessSupervisor`] trait, with [`GroupSupervisor`] as the production
//!   implementation.
//! - [`group`] holds the platform-specific process-group primitives.

pub mod group;
pub mod supervisor;

pub use supervisor::{GroupSupervisor, ProcessHandle, ProcessSupervisor};
