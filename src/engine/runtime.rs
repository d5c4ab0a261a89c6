// src/engine/runtime.rs

use std::collections::BTreeSet;
use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::errors::Result;
use crate::exec::{ProcessHandle, ProcessSupervisor};
use crate::watch::{resolve, FsEvent, NotifySource, TreeRegistrar};

use super::core::CoreRuntime;
use super::{CoreCommand, OrchestratorState};

/// The watch loop.
///
/// Wires the notification source's event stream through the pure
/// [`CoreRuntime`] and executes what it decides: registering new
/// directories with the [`TreeRegistrar`] and driving the
/// [`ProcessSupervisor`].
///
/// The orchestrator is the single owner of the current [`ProcessHandle`];
/// both the event path and the shutdown path stop it through
/// [`Orchestrator::kill_current`].
pub struct Orchestrator<S: NotifySource, P: ProcessSupervisor> {
    config: WatchConfig,
    work_dir: PathBuf,
    core: CoreRuntime,
    registrar: TreeRegistrar,
    source: S,
    events: mpsc::UnboundedReceiver<FsEvent>,
    supervisor: P,
    current: Option<ProcessHandle>,
    state: OrchestratorState,
}

impl<S: NotifySource, P: ProcessSupervisor> fmt::Debug for Orchestrator<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("state", &self.state)
            .field("work_dir", &self.work_dir)
            .field("core", &self.core)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

impl<S: NotifySource, P: ProcessSupervisor> Orchestrator<S, P> {
    pub fn new(
        config: WatchConfig,
        work_dir: impl Into<PathBuf>,
        source: S,
        events: mpsc::UnboundedReceiver<FsEvent>,
        supervisor: P,
    ) -> Result<Self> {
        let work_dir = work_dir.into();
        let core = CoreRuntime::from_config(&config, &work_dir)?;
        Ok(Self {
            config,
            work_dir,
            core,
            registrar: TreeRegistrar::new(),
            source,
            events,
            supervisor,
            current: None,
            state: OrchestratorState::Initializing,
        })
    }

    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// Paths currently registered with the notification source.
    pub fn watch_list(&self) -> Vec<PathBuf> {
        self.registrar.watch_list()
    }

    /// Whether a command instance is currently recorded.
    pub fn has_current(&self) -> bool {
        self.current.is_some()
    }

    /// Initialize, process events until `shutdown` resolves, then tear down.
    ///
    /// Returns `Ok(())` after a clean interrupt-driven shutdown. Watch-set
    /// failures are returned as errors, after the running command (if any)
    /// has been stopped.
    pub async fn run<F>(mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let outcome = match self.initialize() {
            Ok(()) => self.event_loop(shutdown).await,
            Err(err) => Err(err),
        };

        self.shut_down().await;
        outcome
    }

    /// Resolve every watch pattern, register the resulting trees, and start
    /// the command once if `run_on_start` is set.
    pub fn initialize(&mut self) -> Result<()> {
        self.state = OrchestratorState::Initializing;
        info!(cmd = %self.config.command_line(), "command to run");
        info!(paths = ?self.config.patterns(), "watched paths");

        let patterns = self.config.patterns().to_vec();
        let mut walked = BTreeSet::new();
        for pattern in &patterns {
            let resolved = resolve(pattern, &self.work_dir)?;
            self.registrar.register_path(&mut self.source, &resolved.root)?;
            debug!(pattern = %pattern, matches = ?resolved.matches, "glob matches");

            for path in &resolved.matches {
                self.register_matched(path, &mut walked)?;
            }
        }

        debug!(watchlist = ?self.registrar.watch_list(), "current watch list");

        if self.config.run_on_start() {
            info!("starting initial run");
            self.spawn_command();
        }

        self.state = OrchestratorState::Running;
        Ok(())
    }

    async fn event_loop<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                // Once the interrupt is in, no further events are handled.
                biased;

                _ = &mut shutdown => {
                    info!("received interrupt, exiting");
                    return Ok(());
                }

                event = self.events.recv() => match event {
                    Some(event) => self.handle_event(event).await?,
                    None => {
                        warn!("notification stream closed; waiting for interrupt");
                        shutdown.as_mut().await;
                        return Ok(());
                    }
                },
            }
        }
    }

    /// Process one filesystem event to completion.
    pub async fn handle_event(&mut self, event: FsEvent) -> Result<()> {
        debug!(op = ?event.op, path = ?event.path, "detected filesystem event");

        let step = self.core.step(&event, Instant::now());
        if let Some(reason) = step.skipped {
            debug!(?reason, path = ?event.path, "skipping event");
            return Ok(());
        }

        for command in step.commands {
            match command {
                CoreCommand::RegisterCreated(path) => self.register_created(&path)?,
                CoreCommand::KillCurrent => self.kill_current().await,
                CoreCommand::Spawn => self.spawn_command(),
            }
        }
        Ok(())
    }

    /// A path matched at startup: directories get their whole tree, files
    /// get their directory's tree. `walked` holds the trees already
    /// registered during this initialization.
    fn register_matched(&mut self, path: &Path, walked: &mut BTreeSet<PathBuf>) -> Result<()> {
        let tree = if path.is_dir() {
            path
        } else {
            match path.parent() {
                Some(parent) => parent,
                None => return Ok(()),
            }
        };

        if walked.insert(tree.to_path_buf()) {
            self.registrar.register_tree(&mut self.source, tree)?;
        }
        Ok(())
    }

    /// A path was created while running. Gone-again paths are ignored.
    fn register_created(&mut self, path: &Path) -> Result<()> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) => m,
            Err(err) => {
                debug!(path = ?path, error = %err, "created path no longer exists");
                return Ok(());
            }
        };

        if metadata.is_dir() {
            debug!(path = ?path, "directory created, adding tree to watcher");
            self.registrar.register_tree(&mut self.source, path)?;
        } else {
            let parent_watched = path
                .parent()
                .is_some_and(|parent| self.registrar.is_registered(parent));
            if !parent_watched {
                debug!(path = ?path, "file created, adding to watcher");
                self.registrar.register_if_present(&mut self.source, path)?;
            }
        }
        Ok(())
    }

    /// Start a new command instance.
    ///
    /// A previous instance that is still recorded is left running; only
    /// `CoreCommand::KillCurrent` stops it. Spawn failures are logged and
    /// the loop carries on.
    fn spawn_command(&mut self) {
        debug!(cmd = %self.config.command_line(), "running command");

        match self.supervisor.spawn(self.config.command()) {
            Ok(handle) => {
                self.core.command_started(handle.started_at());
                if let Some(previous) = self.current.replace(handle) {
                    debug!(pgid = previous.pgid(), "previous command instance left running");
                }
            }
            Err(err) => {
                warn!(error = %err, "could not start command");
            }
        }
    }

    /// Kill the recorded command instance, if any, and wait until it is
    /// reaped. Kill errors are logged; the instance is forgotten either way.
    pub async fn kill_current(&mut self) {
        let Some(handle) = self.current.take() else {
            return;
        };

        let pgid = handle.pgid();
        if let Err(err) = self.supervisor.kill(handle).await {
            warn!(pgid, error = %err, "error while killing command");
        }
    }

    async fn shut_down(&mut self) {
        self.state = OrchestratorState::ShuttingDown;
        self.kill_current().await;
        self.source.close();
        self.state = OrchestratorState::Terminated;
        info!("shutdown complete");
    }
}
