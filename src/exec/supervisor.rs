// src/exec/supervisor.rs

//! Lifecycle of the watched command: spawn, kill (process-group wide), reap.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::{CngError, Result};
use crate::exec::group;

/// The currently running command instance.
///
/// Owned by the orchestrator between spawns; handed back to the supervisor to
/// be killed.
pub struct ProcessHandle {
    pgid: u32,
    started_at: Instant,
    child: Option<Child>,
}

impl fmt::Debug for ProcessHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("pgid", &self.pgid)
            .field("started_at", &self.started_at)
            .finish_non_exhaustive()
    }
}

impl ProcessHandle {
    /// Wrap a freshly spawned child that leads its own process group.
    pub fn from_child(child: Child) -> Result<Self> {
        let pgid = child
            .id()
            .ok_or_else(|| CngError::Spawn("child exited before its pid was read".to_string()))?;
        Ok(Self {
            pgid,
            started_at: Instant::now(),
            child: Some(child),
        })
    }

    /// A handle with no OS process behind it, for supervisors that only
    /// simulate commands.
    #[cfg(feature = "test-support")]
    #[doc(hidden)]
    pub fn simulated(pgid: u32) -> Self {
        Self {
            pgid,
            started_at: Instant::now(),
            child: None,
        }
    }

    /// Process-group identifier (equal to the leader's pid).
    pub fn pgid(&self) -> u32 {
        self.pgid
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }
}

/// Trait abstracting how the command is started and stopped.
///
/// Production code uses [`GroupSupervisor`]; tests can provide their own
/// implementation that doesn't spawn real processes.
pub trait ProcessSupervisor: Send {
    /// Start `command` (program followed by arguments) without waiting for it.
    fn spawn(&mut self, command: &[String]) -> Result<ProcessHandle>;

    /// Interrupt the handle's whole process group and wait until the process
    /// has been reaped.
    ///
    /// An error means signalling failed; the process is reaped regardless.
    fn kill(
        &mut self,
        handle: ProcessHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// How long group members get to exit after SIGINT before they are killed.
const GROUP_GRACE: Duration = Duration::from_secs(1);

/// Real supervisor: each command gets a new process group and inherits
/// stdout/stderr so colours and interactive output pass through untouched.
#[derive(Debug, Default)]
pub struct GroupSupervisor;

impl GroupSupervisor {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessSupervisor for GroupSupervisor {
    fn spawn(&mut self, command: &[String]) -> Result<ProcessHandle> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| CngError::Spawn("empty command".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        group::new_group(&mut cmd);

        let child = cmd
            .spawn()
            .map_err(|e| CngError::Spawn(format!("{program}: {e}")))?;
        let handle = ProcessHandle::from_child(child)?;

        info!(pgid = handle.pgid, cmd = %command.join(" "), "started command process");
        Ok(handle)
    }

    fn kill(
        &mut self,
        handle: ProcessHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(kill_and_reap(handle))
    }
}

async fn kill_and_reap(mut handle: ProcessHandle) -> Result<()> {
    let pgid = handle.pgid;
    let Some(mut child) = handle.child.take() else {
        return Ok(());
    };

    // The group is signalled either way: a leader that already exited may
    // have left background members behind.
    let leader_exited = child.try_wait()?.is_some();

    info!(pgid, leader_exited, "killing current command process group");
    let mut signalled = group::interrupt_group(pgid).await;

    if let Err(err) = &signalled {
        if leader_exited {
            debug!(pgid, error = %err, "group already gone");
            signalled = Ok(());
        } else {
            // Fall back to the leader alone so the wait below cannot hang on
            // a process we failed to signal.
            warn!(pgid, error = %err, "could not signal process group; killing leader");
            if let Err(e) = child.start_kill() {
                debug!(pgid, error = %e, "leader already gone");
            }
        }
    }

    let status = child.wait().await?;
    debug!(pgid, %status, "command process reaped");

    if let Err(err) = group::settle_group(pgid, GROUP_GRACE).await {
        warn!(pgid, error = %err, "could not clean up process group");
    }

    signalled
}
