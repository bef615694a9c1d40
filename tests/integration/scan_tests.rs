use dupesweep::duplicates::{DuplicateFinder, FinderConfig, MergePolicy};
use dupesweep::scanner::{ScanOptions, Walker};
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

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_sets, 0);
    assert!(!summary.has_errors());
}

#[test]
fn test_exact_duplicates_form_one_set() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "x.png", &[1, 2, 3]);
    write_file(dir.path(), "y.png", &[1, 2, 3]);
    write_file(dir.path(), "z.png", &[1, 2, 4]);

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths(), vec!["./x.png", "./y.png"]);
    assert_eq!(sets[0].size, 3);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.candidate_files, 3);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 3);
}

#[test]
fn test_no_duplicates_is_empty_not_error() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a.png", b"a");
    write_file(dir.path(), "b.png", b"bb");
    write_file(dir.path(), "c.png", b"c");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_sets, 0);
}

#[test]
fn test_hidden_entries_are_excluded() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), ".secret", b"same");
    write_file(dir.path(), "photo.png", b"same");
    write_file(dir.path(), ".cache/photo.png", b"same");

    let walker = Walker::new(dir.path(), ScanOptions::new(true));
    let outcome = walker.scan().unwrap();
    let paths: Vec<&str> = outcome.files.iter().map(|f| f.path.as_str()).collect();

    assert_eq!(paths, vec!["./photo.png"]);

    let (sets, _) = DuplicateFinder::new(FinderConfig::default().with_recursive(true))
        .find_duplicates(dir.path())
        .unwrap();
    assert!(sets.is_empty());
}

#[test]
fn test_recursion_toggle() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "b.png", b"same");
    write_file(dir.path(), "sub/c.png", b"same");

    let flat = Walker::new(dir.path(), ScanOptions::new(false)).scan().unwrap();
    let flat_paths: Vec<&str> = flat.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(flat_paths, vec!["./b.png"]);

    let deep = Walker::new(dir.path(), ScanOptions::new(true)).scan().unwrap();
    let deep_paths: Vec<&str> = deep.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(deep_paths, vec!["./b.png", "./sub/c.png"]);

    let (flat_sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    assert!(flat_sets.is_empty());

    let (deep_sets, _) = DuplicateFinder::new(FinderConfig::default().with_recursive(true))
        .find_duplicates(dir.path())
        .unwrap();
    assert_eq!(deep_sets.len(), 1);
    assert_eq!(deep_sets[0].paths(), vec!["./b.png", "./sub/c.png"]);
}

#[test]
fn test_same_size_different_content_never_grouped() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"abcd");
    write_file(dir.path(), "b", b"abce");
    write_file(dir.path(), "c", b"abcf");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.candidate_files, 3);
    assert!(summary.comparisons >= 2);
}

#[test]
fn test_empty_files_are_duplicates_of_each_other() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "empty1", b"");
    write_file(dir.path(), "empty2", b"");

    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 0);
    assert_eq!(sets[0].wasted_space(), 0);
}

#[test]
fn test_multiple_sets_are_disjoint_and_ordered_by_size() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "big1", b"0123456789");
    write_file(dir.path(), "big2", b"0123456789");
    write_file(dir.path(), "small1", b"ab");
    write_file(dir.path(), "small2", b"ab");
    write_file(dir.path(), "small3", b"ab");

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 2);
    assert_eq!(sets[0].size, 2);
    assert_eq!(sets[0].len(), 3);
    assert_eq!(sets[1].size, 10);
    assert_eq!(summary.duplicate_files, 3);

    let mut seen = std::collections::HashSet::new();
    for set in &sets {
        for path in set.paths() {
            assert!(seen.insert(path.to_string()), "{path} in two sets");
        }
    }
}

#[test]
fn test_merge_policies_agree_on_membership() {
    let dir = tempdir().unwrap();
    for (name, content) in [
        ("a", b"one".as_slice()),
        ("b", b"two"),
        ("c", b"one"),
        ("d", b"two"),
        ("e", b"one"),
    ] {
        write_file(dir.path(), name, content);
    }

    let run = |policy| {
        DuplicateFinder::new(FinderConfig::default().with_merge_policy(policy))
            .find_duplicates(dir.path())
            .unwrap()
            .0
    };

    let union_find = run(MergePolicy::UnionFind);
    let first_match = run(MergePolicy::FirstMatch);

    let normalize = |sets: &Vec<dupesweep::duplicates::DuplicateSet>| {
        let mut groups: Vec<Vec<String>> = sets
            .iter()
            .map(|s| {
                let mut paths: Vec<String> = s.paths().iter().map(|p| p.to_string()).collect();
                paths.sort();
                paths
            })
            .collect();
        groups.sort();
        groups
    };

    assert_eq!(normalize(&union_find), normalize(&first_match));
    assert_eq!(
        normalize(&union_find),
        vec![
            vec!["./a".to_string(), "./c".to_string(), "./e".to_string()],
            vec!["./b".to_string(), "./d".to_string()],
        ]
    );
}

#[test]
fn test_ignore_patterns_exclude_files() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "keep.png", b"same");
    write_file(dir.path(), "drop.tmp", b"same");

    let options = ScanOptions::new(false).with_ignore_patterns(vec!["*.tmp".to_string()]);
    let (sets, summary) = DuplicateFinder::new(FinderConfig::default().with_scan_options(options))
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_repeated_runs_are_identical() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a/1", b"xyz");
    write_file(dir.path(), "b/1", b"xyz");
    write_file(dir.path(), "c", b"xyz");

    let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(true));
    let (first, _) = finder.find_duplicates(dir.path()).unwrap();
    let (second, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].paths(), vec!["./a/1", "./b/1", "./c"]);
}
