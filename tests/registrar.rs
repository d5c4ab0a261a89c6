// tests/registrar.rs

use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

use cng::errors::CngError;
use cng::watch::TreeRegistrar;
use cng_test_utils::fake_source::{added_paths, FakeSource};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn registers_every_directory_but_no_files() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    fs::create_dir_all(root.join("a/b"))?;
    fs::create_dir_all(root.join("c"))?;
    fs::write(root.join("a/file.txt"), "x")?;
    fs::write(root.join("top.txt"), "x")?;

    let (mut source, _tx, _rx) = FakeSource::new();
    let calls = source.calls();
    let mut registrar = TreeRegistrar::new();

    let added = registrar.register_tree(&mut source, root)?;

    let expected: BTreeSet<PathBuf> = [
        root.to_path_buf(),
        root.join("a"),
        root.join("a/b"),
        root.join("c"),
    ]
    .into_iter()
    .collect();

    assert_eq!(added, 4);
    assert_eq!(added_paths(&calls).into_iter().collect::<BTreeSet<_>>(), expected);
    assert_eq!(registrar.watch_list().into_iter().collect::<BTreeSet<_>>(), expected);
    Ok(())
}

#[test]
fn registration_is_idempotent() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("x/y"))?;

    let (mut source, _tx, _rx) = FakeSource::new();
    let calls = source.calls();
    let mut registrar = TreeRegistrar::new();

    assert_eq!(registrar.register_tree(&mut source, dir.path())?, 3);
    assert_eq!(registrar.register_tree(&mut source, dir.path())?, 0);
    assert!(!registrar.register_path(&mut source, &dir.path().join("x"))?);

    assert_eq!(added_paths(&calls).len(), 3);
    assert_eq!(registrar.len(), 3);
    Ok(())
}

#[test]
fn new_subtree_extends_existing_watch_set() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (mut source, _tx, _rx) = FakeSource::new();
    let mut registrar = TreeRegistrar::new();

    registrar.register_tree(&mut source, dir.path())?;
    assert_eq!(registrar.len(), 1);

    fs::create_dir_all(dir.path().join("later/nested"))?;
    let added = registrar.register_tree(&mut source, &dir.path().join("later"))?;

    assert_eq!(added, 2);
    assert!(registrar.is_registered(&dir.path().join("later/nested")));
    Ok(())
}

#[test]
fn vanished_root_is_skipped() -> TestResult {
    let dir = tempfile::tempdir()?;
    let (mut source, _tx, _rx) = FakeSource::new();
    let mut registrar = TreeRegistrar::new();

    let added = registrar.register_tree(&mut source, &dir.path().join("gone"))?;

    assert_eq!(added, 0);
    assert!(registrar.is_empty());
    Ok(())
}

#[test]
fn directory_removed_during_walk_is_skipped() -> TestResult {
    let dir = tempfile::tempdir()?;
    let root = dir.path();
    fs::create_dir_all(root.join("short-lived/inner"))?;
    fs::create_dir_all(root.join("stays"))?;

    let (source, _tx, _rx) = FakeSource::new();
    let mut source = source.vanishing_on(root.join("short-lived"));
    let mut registrar = TreeRegistrar::new();

    let added = registrar.register_tree(&mut source, root)?;

    assert_eq!(added, 2);
    assert!(registrar.is_registered(root));
    assert!(registrar.is_registered(&root.join("stays")));
    assert!(!registrar.is_registered(&root.join("short-lived")));
    assert!(!registrar.is_registered(&root.join("short-lived/inner")));
    Ok(())
}

#[test]
fn source_failure_is_fatal() -> TestResult {
    let dir = tempfile::tempdir()?;
    fs::create_dir_all(dir.path().join("bad"))?;

    let (source, _tx, _rx) = FakeSource::new();
    let mut source = source.failing_on(dir.path().join("bad"));
    let mut registrar = TreeRegistrar::new();

    match registrar.register_tree(&mut source, dir.path()) {
        Err(CngError::WatchSetup(msg)) => assert!(msg.contains("Could not watch path")),
        Err(e) => panic!("Expected WatchSetup error, got: {e:?}"),
        Ok(n) => panic!("Expected error, registered {n} paths"),
    }
    assert!(!registrar.is_registered(&dir.path().join("bad")));
    Ok(())
}
