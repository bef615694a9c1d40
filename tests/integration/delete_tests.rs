use dupesweep::actions::{delete_selected, validate_selection, DeleteConfig, DeleteError};
use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
use dupesweep::scanner::FsAccessGate;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
}

fn selection(paths: &[&str]) -> HashSet<String> {
    paths.iter().map(|p| (*p).to_string()).collect()
}

#[test]
fn test_scan_then_delete_one_copy() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "x.png", &[1, 2, 3]);
    write_file(dir.path(), "y.png", &[1, 2, 3]);
    write_file(dir.path(), "z.png", &[1, 2, 4]);

    let finder = DuplicateFinder::with_defaults();
    let (sets, _) = finder.find_duplicates(dir.path()).unwrap();
    assert_eq!(sets.len(), 1);

    let chosen = selection(&["./y.png"]);
    validate_selection(&sets, &chosen).unwrap();

    let result = delete_selected(
        dir.path(),
        &chosen,
        &DeleteConfig::default(),
        &FsAccessGate,
        None,
    )
    .unwrap();

    assert_eq!(result.success_count(), 1);
    assert!(dir.path().join("x.png").exists());
    assert!(!dir.path().join("y.png").exists());
    assert!(dir.path().join("z.png").exists());

    let (after, _) = finder.find_duplicates(dir.path()).unwrap();
    assert!(after.is_empty());
}

#[test]
fn test_delete_reaches_subdirectories_after_flat_scan() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.png", b"top");
    write_file(dir.path(), "nested/deeper/a.png", b"nested");

    let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(false));
    let (sets, _) = finder.find_duplicates(dir.path()).unwrap();
    assert!(sets.is_empty());

    let result = delete_selected(
        dir.path(),
        &selection(&["./nested/deeper/a.png"]),
        &DeleteConfig::default(),
        &FsAccessGate,
        None,
    )
    .unwrap();

    assert_eq!(result.success_count(), 1);
    assert!(dir.path().join("a.png").exists());
    assert!(dir.path().join("nested/deeper").is_dir());
    assert!(!dir.path().join("nested/deeper/a.png").exists());
}

#[test]
fn test_delete_everything_else_untouched() {
    let dir = tempdir().unwrap();
    let names = ["a", "b", "c", "sub/d", "sub/e", ".hidden"];
    for name in names {
        write_file(dir.path(), name, name.as_bytes());
    }

    delete_selected(
        dir.path(),
        &selection(&["./b", "./sub/e"]),
        &DeleteConfig::default(),
        &FsAccessGate,
        None,
    )
    .unwrap();

    for name in ["a", "c", "sub/d", ".hidden"] {
        assert!(dir.path().join(name).exists(), "{name} should remain");
    }
    for name in ["b", "sub/e"] {
        assert!(!dir.path().join(name).exists(), "{name} should be gone");
    }
}

#[test]
fn test_selection_from_older_scan_is_noop_for_missing() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "x.png", b"x");
    write_file(dir.path(), "y.png", b"x");
    fs::remove_file(dir.path().join("y.png")).unwrap();

    let result = delete_selected(
        dir.path(),
        &selection(&["./y.png"]),
        &DeleteConfig::default(),
        &FsAccessGate,
        None,
    )
    .unwrap();

    assert_eq!(result.success_count(), 0);
    assert!(result.all_succeeded());
    assert_eq!(result.missing, vec!["./y.png".to_string()]);
    assert!(dir.path().join("x.png").exists());
}

#[test]
fn test_validate_rejects_removing_every_copy() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "x.png", b"dup");
    write_file(dir.path(), "y.png", b"dup");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let err = validate_selection(&sets, &selection(&["./x.png", "./y.png"])).unwrap_err();
    assert!(matches!(err, DeleteError::AllCopiesWouldBeDeleted(_)));
}

#[test]
fn test_delete_into_missing_root_fails() {
    let dir = tempdir().unwrap();
    let gone = dir.path().join("gone");

    let err = delete_selected(
        &gone,
        &selection(&["./x"]),
        &DeleteConfig::default(),
        &FsAccessGate,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, DeleteError::RootUnavailable { .. }));
    assert_eq!(err.path(), Some(gone.as_path()));
}
