// tests/process_group.rs

#![cfg(unix)]

use std::error::Error;
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::sys::signal::{killpg, Signal};
use nix::unistd::Pid;

use cng::errors::CngError;
use cng::exec::{GroupSupervisor, ProcessSupervisor};
use cng_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

fn group_alive(pgid: u32) -> bool {
    !matches!(
        killpg(Pid::from_raw(pgid as i32), None::<Signal>),
        Err(Errno::ESRCH)
    )
}

/// Whether `pid` is still running. Zombies count as gone: an orphan may
/// not be reaped promptly when no init process runs (e.g. in containers).
#[cfg(target_os = "linux")]
fn pid_running(pid: u32) -> bool {
    match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
        Ok(stat) => stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.split_whitespace().next())
            .is_some_and(|state| state != "Z"),
        Err(_) => false,
    }
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn kill_reaches_grandchildren() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("grandchild.pid");
    let mut supervisor = GroupSupervisor::new();

    // The inner shell records its pid and becomes `sleep`; the trailing
    // `; true` keeps the outer shell alive as the group leader.
    let script = format!(
        "sh -c 'echo $$ > {}; exec sleep 30'; true",
        pid_file.display()
    );
    let handle = supervisor.spawn(&argv(&["sh", "-c", &script]))?;
    let pgid = handle.pgid();

    let grandchild: u32 = with_timeout(async {
        loop {
            if let Ok(text) = std::fs::read_to_string(&pid_file) {
                if let Ok(pid) = text.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert_ne!(grandchild, pgid);
    assert!(pid_running(grandchild));
    assert!(group_alive(pgid));

    with_timeout(supervisor.kill(handle)).await?;

    let deadline = Instant::now() + Duration::from_secs(5);
    while pid_running(grandchild) {
        assert!(
            Instant::now() < deadline,
            "grandchild {grandchild} survived killing group {pgid}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Ok(())
}

// A background job outlives its shell and ignores SIGINT; killing the command
// after the shell is gone must still clear the group.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn kill_after_leader_exit_clears_background_jobs() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let pid_file = dir.path().join("bg.pid");
    let mut supervisor = GroupSupervisor::new();

    let script = format!("sleep 30 & echo $! > {}", pid_file.display());
    let handle = supervisor.spawn(&argv(&["sh", "-c", &script]))?;
    let pgid = handle.pgid();

    let background: u32 = with_timeout(async {
        loop {
            if let Ok(text) = std::fs::read_to_string(&pid_file) {
                if let Ok(pid) = text.trim().parse() {
                    return pid;
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    // Let the shell finish so only the background job is left running.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(pid_running(background));
    assert!(group_alive(pgid));

    with_timeout(supervisor.kill(handle)).await?;

    let deadline = Instant::now() + Duration::from_secs(5);
    while pid_running(background) {
        assert!(
            Instant::now() < deadline,
            "background job {background} survived killing group {pgid}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    Ok(())
}

#[tokio::test]
async fn spawn_runs_in_its_own_group() -> TestResult {
    init_tracing();
    let mut supervisor = GroupSupervisor::new();

    let handle = supervisor.spawn(&argv(&["sleep", "30"]))?;
    let pgid = handle.pgid();

    let child_group = nix::unistd::getpgid(Some(Pid::from_raw(pgid as i32)))?;
    let our_group = nix::unistd::getpgrp();
    assert_eq!(child_group.as_raw() as u32, pgid);
    assert_ne!(child_group, our_group);

    with_timeout(supervisor.kill(handle)).await?;
    Ok(())
}

#[tokio::test]
async fn killing_an_exited_command_succeeds() -> TestResult {
    init_tracing();
    let mut supervisor = GroupSupervisor::new();

    let handle = supervisor.spawn(&argv(&["true"]))?;
    tokio::time::sleep(Duration::from_millis(200)).await;

    with_timeout(supervisor.kill(handle)).await?;
    Ok(())
}

#[tokio::test]
async fn missing_program_is_a_spawn_error() {
    init_tracing();
    let mut supervisor = GroupSupervisor::new();

    match supervisor.spawn(&argv(&["cng-definitely-not-a-real-program"])) {
        Err(CngError::Spawn(msg)) => assert!(msg.contains("cng-definitely-not-a-real-program")),
        other => panic!("Expected Spawn error, got: {other:?}"),
    }
}

#[tokio::test]
async fn empty_command_is_a_spawn_error() {
    let mut supervisor = GroupSupervisor::new();
    assert!(matches!(supervisor.spawn(&[]), Err(CngError::Spawn(_))));
}
