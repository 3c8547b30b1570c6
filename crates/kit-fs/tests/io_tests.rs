use kit_fs::io::{self, WriteOptions, backup_path};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_write_atomic_creates_file_and_parents() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("dir").join("rules.md");

    let outcome = io::write_atomic(&path, b"hello world").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    assert_eq!(outcome.path, path);
    assert!(outcome.backup.is_none());
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.md");
    fs::write(&path, "original").unwrap();

    io::write_atomic(&path, b"updated").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "updated");
    assert_eq!(entries(temp.path()), vec!["rules.md"]);
}

#[test]
fn test_backup_taken_before_overwrite() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.md");
    fs::write(&path, "original").unwrap();

    let outcome = io::write_with(&path, WriteOptions::with_backup(), |f| f.write_all(b"new")).unwrap();

    let backup = outcome.backup.unwrap();
    assert_eq!(backup, backup_path(&path));
    assert_eq!(fs::read_to_string(&backup).unwrap(), "original");
    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
}

#[test]
fn test_no_backup_for_new_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fresh.md");

    let outcome = io::write_with(&path, WriteOptions::with_backup(), |f| f.write_all(b"x")).unwrap();

    assert!(outcome.backup.is_none());
    assert_eq!(entries(temp.path()), vec!["fresh.md"]);
}

#[test]
fn test_failed_write_leaves_target_unchanged_and_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.md");
    fs::write(&path, "original content").unwrap();

    let result = io::write_with(&path, WriteOptions::default(), |f| {
        f.write_all(b"partial")?;
        Err(std::io::Error::other("disk full"))
    });

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "original content");
    assert_eq!(entries(temp.path()), vec!["rules.md"]);
}

#[test]
fn test_failed_write_with_backup_restores_target() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.md");
    fs::write(&path, "original content").unwrap();

    let result = io::write_with(&path, WriteOptions::with_backup(), |f| {
        f.write_all(b"partial")?;
        Err(std::io::Error::other("interrupted"))
    });

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), "original content");
    assert_eq!(entries(temp.path()), vec!["rules.md", "rules.md.bak"]);
}

#[test]
fn test_failed_write_to_new_target_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("new.md");

    let result = io::write_with(&path, WriteOptions::default(), |_| {
        Err(std::io::Error::other("boom"))
    });

    assert!(result.is_err());
    assert!(entries(temp.path()).is_empty());
}

#[test]
fn test_copy_atomic_streams_source() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("source.md");
    let target = temp.path().join("out").join("target.md");
    fs::write(&source, "# Style guide\n").unwrap();

    io::copy_atomic(&source, &target, WriteOptions::default()).unwrap();

    assert_eq!(fs::read_to_string(&target).unwrap(), "# Style guide\n");
}

#[test]
fn test_copy_atomic_missing_source_is_error() {
    let temp = TempDir::new().unwrap();
    let target = temp.path().join("target.md");

    let err = io::copy_atomic(&temp.path().join("missing.md"), &target, WriteOptions::default())
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(!target.exists());
    assert!(entries(temp.path()).is_empty());
}

#[test]
fn test_old_backups_are_replaced_not_pruned() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rules.md");
    fs::write(&path, "v1").unwrap();

    io::write_with(&path, WriteOptions::with_backup(), |f| f.write_all(b"v2")).unwrap();
    io::write_with(&path, WriteOptions::with_backup(), |f| f.write_all(b"v3")).unwrap();

    assert_eq!(fs::read_to_string(backup_path(&path)).unwrap(), "v2");
    assert_eq!(fs::read_to_string(&path).unwrap(), "v3");
}
