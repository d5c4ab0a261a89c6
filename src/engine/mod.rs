// src/engine/mod.rs

//! Orchestration engine for cng.
//!
//! The pure decision core lives in [`core`] (with the per-event rules in
//! [`event_handlers`]); the async/IO shell that owns the watch set, the
//! notification source and the running command is [`runtime`].

/// Lifecycle of the orchestrator.
///
/// `Initializing → Running → ShuttingDown → Terminated`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    /// Resolving patterns, registering trees, optional initial run.
    Initializing,
    /// Waiting on filesystem events and the interrupt signal.
    Running,
    /// Killing the in-flight command and closing the notification source.
    ShuttingDown,
    Terminated,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep, SkipReason};
pub use runtime::Orchestrator;
