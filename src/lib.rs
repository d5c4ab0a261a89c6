// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod watch;

use std::future::pending;
use std::path::PathBuf;

use tokio::sync::oneshot;
use tracing::debug;

use crate::config::WatchConfig;
use crate::engine::Orchestrator;
use crate::errors::{CngError, Result};
use crate::exec::GroupSupervisor;
use crate::watch::NotifyWatcherSource;

/// Directory relative patterns are anchored to.
pub fn working_dir() -> Result<PathBuf> {
    std::env::current_dir()
        .map_err(|e| CngError::WatchSetup(format!("could not determine working directory: {e}")))
}

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - the `notify` backed notification source
/// - the process-group supervisor
/// - Ctrl-C handling
/// - the orchestrator, which runs until interrupted
pub async fn run(config: WatchConfig, work_dir: PathBuf) -> Result<()> {
    let (source, events) = NotifyWatcherSource::new()?;
    let supervisor = GroupSupervisor::new();

    // Ctrl-C → graceful shutdown.
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            return;
        }
        let _ = tx.send(());
    });

    let shutdown = async move {
        // Without a working listener, run until killed from outside.
        if rx.await.is_err() {
            pending::<()>().await;
        }
    };

    debug!(work_dir = ?work_dir, "starting orchestrator");
    let orchestrator = Orchestrator::new(config, work_dir, source, events, supervisor)?;
    orchestrator.run(shutdown).await
}
