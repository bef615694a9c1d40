use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::error::ExitCode;
use dupesweep::run_app;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Temp tree plus an empty config file so the user's own settings stay out.
fn fixture() -> (TempDir, String) {
    let dir = tempdir().unwrap();
    let config = dir.path().join("dupesweep.toml");
    fs::write(&config, "").unwrap();
    fs::create_dir(dir.path().join("root")).unwrap();
    (dir, config.to_string_lossy().into_owned())
}

fn write_file(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let cli = Cli::try_parse_from(args).unwrap();
    run_app(cli)
}

#[test]
fn test_scan_exit_code_with_duplicates() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");
    write_file(&root, "x.png", &[1, 2, 3]);
    write_file(&root, "y.png", &[1, 2, 3]);

    let code = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "scan",
        root.to_str().unwrap(),
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
}

#[test]
fn test_scan_exit_code_without_duplicates() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");
    write_file(&root, "x.png", &[1, 2, 3]);

    let code = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "scan",
        root.to_str().unwrap(),
    ])
    .unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
}

#[test]
fn test_scan_missing_path_is_error() {
    let (dir, config) = fixture();
    let missing = dir.path().join("missing");

    let result = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "scan",
        missing.to_str().unwrap(),
    ]);

    assert!(result.is_err());
}

#[test]
fn test_delete_removes_selected_copy() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");
    write_file(&root, "x.png", &[1, 2, 3]);
    write_file(&root, "y.png", &[1, 2, 3]);

    let code = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "delete",
        root.to_str().unwrap(),
        "--select",
        "y.png",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.join("x.png").exists());
    assert!(!root.join("y.png").exists());
}

#[test]
fn test_delete_refuses_to_remove_every_copy() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");
    write_file(&root, "x.png", &[1, 2, 3]);
    write_file(&root, "y.png", &[1, 2, 3]);

    let result = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "delete",
        root.to_str().unwrap(),
        "--select",
        "./x.png",
        "--select",
        "./y.png",
    ]);

    assert!(result.is_err());
    assert!(root.join("x.png").exists());
    assert!(root.join("y.png").exists());
}

#[test]
fn test_delete_refuses_every_copy_across_subdirectories() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");
    write_file(&root, "a.png", b"same");
    write_file(&root, "sub/a.png", b"same");

    let result = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "delete",
        root.to_str().unwrap(),
        "--select",
        "./a.png",
        "--select",
        "./sub/a.png",
    ]);

    assert!(result.is_err());
    assert!(root.join("a.png").exists());
    assert!(root.join("sub/a.png").exists());
}

#[test]
fn test_delete_with_selection_file() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");
    write_file(&root, "a.png", b"same");
    write_file(&root, "sub/b.png", b"same");
    let list = dir.path().join("selection.json");
    fs::write(&list, r#"["./sub/b.png"]"#).unwrap();

    let code = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "delete",
        root.to_str().unwrap(),
        "--select-file",
        list.to_str().unwrap(),
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(root.join("a.png").exists());
    assert!(!root.join("sub/b.png").exists());
}

#[test]
fn test_delete_without_selection_is_error() {
    let (dir, config) = fixture();
    let root = dir.path().join("root");

    let result = run(&[
        "dupesweep",
        "-q",
        "--config",
        &config,
        "delete",
        root.to_str().unwrap(),
    ]);

    assert!(result.is_err());
}

#[test]
fn test_config_command_succeeds() {
    let (_dir, config) = fixture();
    let code = run(&["dupesweep", "-q", "--config", &config, "config"]).unwrap();
    assert_eq!(code, ExitCode::Success);
}
