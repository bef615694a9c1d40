use dupesweep::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dupesweep::scanner::{AccessGate, AccessMode, FileRef, LoadError, ScanError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Refuses every directory named `locked`.
struct LockedGate;

impl AccessGate for LockedGate {
    fn authorize(&self, dir: &Path, _mode: AccessMode) -> Result<(), ScanError> {
        if dir.file_name().is_some_and(|n| n == "locked") {
            return Err(ScanError::AccessDenied {
                path: dir.to_path_buf(),
                reason: "locked".to_string(),
            });
        }
        Ok(())
    }
}

#[test]
fn test_missing_files_are_skipped_and_reported() {
    let finder = DuplicateFinder::with_defaults();
    let files = vec![
        FileRef::new("./nonexistent_1.txt", PathBuf::from("nonexistent_1.txt")),
        FileRef::new("./nonexistent_2.txt", PathBuf::from("nonexistent_2.txt")),
    ];

    let (sets, summary) = finder.find_duplicates_from_files(files).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.load_errors.len(), 2);
    for err in &summary.load_errors {
        assert!(matches!(err, LoadError::NotFound(_)), "got {err:?}");
    }
}

#[test]
fn test_strict_mode_fails_on_unreadable_file() {
    let finder = DuplicateFinder::new(FinderConfig::default().with_strict(true));
    let files = vec![FileRef::new(
        "./nonexistent.txt",
        PathBuf::from("nonexistent.txt"),
    )];

    let err = finder.find_duplicates_from_files(files).unwrap_err();
    assert!(matches!(err, FinderError::Load(LoadError::NotFound(_))));
}

#[test]
fn test_denied_subtree_keeps_sibling_results() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.png", b"same");
    write_file(dir.path(), "open/b.png", b"same");
    write_file(dir.path(), "locked/c.png", b"same");

    let config = FinderConfig::default()
        .with_recursive(true)
        .with_access_gate(Arc::new(LockedGate));
    let (sets, summary) = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths(), vec!["./a.png", "./open/b.png"]);
    assert_eq!(summary.scan_errors.len(), 1);
    assert!(summary.has_errors());
    assert!(matches!(
        summary.scan_errors[0],
        ScanError::AccessDenied { .. }
    ));
}

#[test]
fn test_denied_subtree_is_fatal_in_strict_mode() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "locked/c.png", b"same");

    let config = FinderConfig::default()
        .with_recursive(true)
        .with_strict(true)
        .with_access_gate(Arc::new(LockedGate));
    let err = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::AccessDenied { .. })));
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("nope"))
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "file.png", b"x");
    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&dir.path().join("file.png"))
        .unwrap_err();
    assert!(matches!(err, FinderError::NotADirectory(_)));
}

#[test]
fn test_shutdown_before_start_interrupts() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"a");

    let config = FinderConfig::default().with_shutdown_flag(Arc::new(AtomicBool::new(true)));
    let err = DuplicateFinder::new(config)
        .find_duplicates(dir.path())
        .unwrap_err();
    assert!(matches!(err, FinderError::Interrupted));
}
