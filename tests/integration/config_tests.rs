use dupesweep::config::Config;
use dupesweep::duplicates::MergePolicy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Extract without the Env layer so other tests' variables cannot leak in.
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .extract()
        .unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.io_threads, 4);
}

#[test]
fn test_config_load_from_env() {
    std::env::set_var("DUPESWEEP_IO_THREADS", "16");

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPESWEEP_"))
        .extract()
        .unwrap();

    assert_eq!(config.io_threads, 16);

    std::env::remove_var("DUPESWEEP_IO_THREADS");
}

#[test]
fn test_config_load_from_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
recursive = true
strict = true
merge_policy = "first-match"
ignore_patterns = ["*.tmp", "cache/"]
trash = true
"#,
    )
    .unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .extract()
        .unwrap();

    assert!(config.recursive);
    assert!(config.strict);
    assert!(config.trash);
    assert_eq!(config.merge_policy, MergePolicy::FirstMatch);
    assert_eq!(config.ignore_patterns, vec!["*.tmp", "cache/"]);
    assert!(!config.require_write_access);
}

#[test]
fn test_config_load_explicit_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "require_write_access = true\n").unwrap();

    let config = Config::load(Some(&path)).unwrap();
    assert!(config.require_write_access);
    assert!(config.scan_options().require_write_access);
}

#[test]
fn test_config_rejects_bad_policy() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "merge_policy = \"sometimes\"\n").unwrap();

    assert!(Config::load(Some(&path)).is_err());
}

#[test]
fn test_config_dump_is_valid_toml() {
    let text = Config::default().to_toml().unwrap();
    let value: toml::Value = toml::from_str(&text).unwrap();
    assert_eq!(value["io_threads"].as_integer(), Some(4));
    assert_eq!(value["merge_policy"].as_str(), Some("union-find"));
}
