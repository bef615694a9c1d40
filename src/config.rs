//! Application configuration.
//!
//! Settings are layered with `figment`, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config PATH`, else `config.toml` in the platform
//!    config directory)
//! 3. `DUPESWEEP_*` environment variables
//!
//! Command-line flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::MergePolicy;
use crate::scanner::loader::DEFAULT_IO_THREADS;
use crate::scanner::ScanOptions;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Descend into subdirectories when scanning.
    pub recursive: bool,
    /// Threads used to read file contents.
    pub io_threads: usize,
    /// Fail on the first unreadable directory or file.
    pub strict: bool,
    /// How confirmed equal pairs are merged into sets.
    pub merge_policy: MergePolicy,
    /// Gitignore-style patterns excluded from scans.
    pub ignore_patterns: Vec<String>,
    /// Move deleted files to the trash instead of removing them.
    pub trash: bool,
    /// Ask for write access, not just read access, while scanning.
    pub require_write_access: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            recursive: false,
            io_threads: DEFAULT_IO_THREADS,
            strict: false,
            merge_policy: MergePolicy::default(),
            ignore_patterns: Vec::new(),
            trash: false,
            require_write_access: false,
        }
    }
}

impl Config {
    /// Build the layered figment without extracting it.
    ///
    /// An explicit `path` replaces the platform default file.
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match path {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None => {
                if let Some(default_path) = Self::default_path() {
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the explicit file is missing or any layer holds
    /// a value of the wrong type.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
        }

        let config: Self = Self::figment(path).extract()?;
        log::debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Platform config file location, e.g. `~/.config/dupesweep/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupesweep", "dupesweep")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Scan options derived from this configuration.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::new(self.recursive)
            .with_ignore_patterns(self.ignore_patterns.clone())
            .with_write_access(self.require_write_access)
    }

    /// Render as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
