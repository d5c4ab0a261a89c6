// tests/notify_source.rs

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use notify::event::{
    AccessKind, CreateKind, DataChange, EventKind, MetadataKind, ModifyKind, RemoveKind,
    RenameMode,
};
use notify::Event;
use tokio::sync::oneshot;

use cng::engine::Orchestrator;
use cng::watch::{translate, FsEvent, FsOp, NotifySource, NotifyWatcherSource};
use cng_test_utils::builders::WatchConfigBuilder;
use cng_test_utils::fake_supervisor::{spawn_count, RecordingSupervisor};
use cng_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn event(kind: EventKind, path: &str) -> Event {
    Event::new(kind).add_path(PathBuf::from(path))
}

#[test]
fn translate_maps_change_kinds() {
    let cases = [
        (EventKind::Create(CreateKind::File), FsOp::Create),
        (EventKind::Create(CreateKind::Folder), FsOp::Create),
        (EventKind::Modify(ModifyKind::Data(DataChange::Content)), FsOp::Write),
        (EventKind::Modify(ModifyKind::Any), FsOp::Write),
        (EventKind::Modify(ModifyKind::Name(RenameMode::From)), FsOp::Rename),
        // Arrival side of a move reads as a new path.
        (EventKind::Modify(ModifyKind::Name(RenameMode::To)), FsOp::Create),
        (EventKind::Modify(ModifyKind::Name(RenameMode::Any)), FsOp::Create),
        (
            EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
            FsOp::Chmod,
        ),
        (EventKind::Remove(RemoveKind::File), FsOp::Remove),
    ];

    for (kind, op) in cases {
        assert_eq!(
            translate(&event(kind, "/w/a.txt")),
            vec![FsEvent::new("/w/a.txt", op)],
            "kind {kind:?}"
        );
    }
}

#[test]
fn translate_drops_events_without_changes() {
    assert!(translate(&event(EventKind::Access(AccessKind::Any), "/w/a.txt")).is_empty());
    assert!(translate(&event(EventKind::Other, "/w/a.txt")).is_empty());
    assert!(translate(&event(EventKind::Any, "/w/a.txt")).is_empty());
}

#[test]
fn translate_emits_one_event_per_path() {
    let rename = Event::new(EventKind::Modify(ModifyKind::Name(RenameMode::Both)))
        .add_path(PathBuf::from("/w/old.txt"))
        .add_path(PathBuf::from("/w/new.txt"));

    assert_eq!(
        translate(&rename),
        vec![
            FsEvent::new("/w/old.txt", FsOp::Rename),
            FsEvent::new("/w/new.txt", FsOp::Create),
        ]
    );
}

#[tokio::test]
async fn closed_source_refuses_registration() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (mut source, _events) = NotifyWatcherSource::new()?;

    source.add(dir.path())?;
    source.close();

    assert!(source.add(dir.path()).is_err());
    Ok(())
}

async fn wait_for_spawns(
    calls: &std::sync::Arc<std::sync::Mutex<Vec<cng_test_utils::fake_supervisor::SupervisorCall>>>,
    at_least: usize,
) {
    with_timeout(async {
        while spawn_count(calls) < at_least {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
}

// End to end through the native watcher: a directory created after startup is
// registered, so files created inside it trigger runs.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn files_in_new_subdirectory_trigger_runs() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let cfg = WatchConfigBuilder::new().watch("**/*.txt").build();

    let (source, events) = NotifyWatcherSource::new()?;
    let supervisor = RecordingSupervisor::new();
    let calls = supervisor.calls();
    let orch = Orchestrator::new(cfg, dir.path(), source, events, supervisor)?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(orch.run(async move {
        let _ = stop_rx.await;
    }));

    // Let initialization register the root.
    tokio::time::sleep(Duration::from_millis(200)).await;

    fs::create_dir(dir.path().join("sub"))?;
    wait_for_spawns(&calls, 1).await;
    let after_mkdir = spawn_count(&calls);

    fs::write(dir.path().join("sub/new.txt"), "x")?;
    wait_for_spawns(&calls, after_mkdir + 1).await;

    let _ = stop_tx.send(());
    with_timeout(task).await??;
    Ok(())
}

// A directory moved in from outside the watched tree arrives as a rename, not
// a creation; it still has to be registered along with its subdirectories.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn directory_moved_into_tree_is_watched() -> TestResult {
    init_tracing();
    let base = tempfile::tempdir()?;
    let root = base.path().join("watched");
    let staging = base.path().join("staging");
    fs::create_dir(&root)?;
    fs::create_dir_all(staging.join("moved/inner"))?;

    let cfg = WatchConfigBuilder::new().watch("**/*.txt").build();
    let (source, events) = NotifyWatcherSource::new()?;
    let supervisor = RecordingSupervisor::new();
    let calls = supervisor.calls();
    let orch = Orchestrator::new(cfg, &root, source, events, supervisor)?;

    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(orch.run(async move {
        let _ = stop_rx.await;
    }));

    tokio::time::sleep(Duration::from_millis(200)).await;

    fs::rename(staging.join("moved"), root.join("moved"))?;
    wait_for_spawns(&calls, 1).await;
    // Give the registration of the moved tree time to land.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let after_move = spawn_count(&calls);

    fs::write(root.join("moved/inner/new.txt"), "x")?;
    wait_for_spawns(&calls, after_move + 1).await;

    let _ = stop_tx.send(());
    with_timeout(task).await??;
    Ok(())
}
