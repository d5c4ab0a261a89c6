// src/exec/group.rs

//! Platform process-group primitives.
//!
//! The watched command runs in its own process group so that one signal
//! reaches it and everything it forked (e.g. a dev server's workers). Killing
//! only the direct child would orphan grandchildren that may still hold
//! ports or files when the next instance starts.

use std::time::Duration;
#[cfg(unix)]
use std::time::Instant;

use tokio::process::Command;
#[cfg(unix)]
use tracing::warn;

use crate::errors::{CngError, Result};

/// Make `cmd` start as the leader of a new process group.
#[cfg(unix)]
pub fn new_group(cmd: &mut Command) {
    cmd.process_group(0);
}

/// Make `cmd` start as the root of a new process group.
#[cfg(windows)]
pub fn new_group(cmd: &mut Command) {
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP);
}

/// Send SIGINT to the process group `pgid`.
///
/// The leader is the group's first member but not its only one, so this is
/// sent even when the leader has already exited. A group with no members
/// left (ESRCH) counts as success.
#[cfg(unix)]
pub async fn interrupt_group(pgid: u32) -> Result<()> {
    signal_group(pgid, nix::sys::signal::Signal::SIGINT)
}

/// Wait up to `grace` for every member of `pgid` to exit, then SIGKILL
/// whatever is left.
///
/// Background jobs of a non-interactive shell start with SIGINT ignored, so
/// an interrupt alone can leave them running.
#[cfg(unix)]
pub async fn settle_group(pgid: u32, grace: Duration) -> Result<()> {
    let deadline = Instant::now() + grace;
    while group_alive(pgid) {
        if Instant::now() >= deadline {
            warn!(pgid, "process group outlived SIGINT; sending SIGKILL");
            return signal_group(pgid, nix::sys::signal::Signal::SIGKILL);
        }
        tokio::time::sleep(SETTLE_POLL).await;
    }
    Ok(())
}

#[cfg(unix)]
const SETTLE_POLL: Duration = Duration::from_millis(20);

#[cfg(unix)]
fn signal_group(pgid: u32, signal: nix::sys::signal::Signal) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pgid as i32), signal) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(e) => Err(CngError::Kill(format!("killpg({pgid}, {signal:?}): {e}"))),
    }
}

/// Whether any process is still in group `pgid`.
#[cfg(unix)]
pub fn group_alive(pgid: u32) -> bool {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    killpg(Pid::from_raw(pgid as i32), None::<Signal>).is_ok()
}

/// Terminate the process tree rooted at `pid`.
///
/// `taskkill /F` is already forceful, so there is nothing to settle.
#[cfg(windows)]
pub async fn interrupt_group(pid: u32) -> Result<()> {
    let status = Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .status()
        .await
        .map_err(|e| CngError::Kill(format!("running taskkill for {pid}: {e}")))?;

    if !status.success() {
        return Err(CngError::Kill(format!("taskkill for {pid} exited with {status}")));
    }
    Ok(())
}

#[cfg(windows)]
pub async fn settle_group(_pid: u32, _grace: Duration) -> Result<()> {
    Ok(())
}
