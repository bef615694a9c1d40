//! Directory walker implementation using jwalk for parallel traversal.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileRef`]s for duplicate detection. It uses
//! [`jwalk`] for parallel directory reads while still yielding entries in a
//! deterministic depth-first, name-sorted order.
//!
//! # Features
//!
//! - Recursive or single-level traversal
//! - Hidden entries (names starting with `.`) are always skipped
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Per-directory authorization through an [`AccessGate`]
//! - Partial results: an unreadable subtree is reported, its siblings are
//!   still scanned
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{ScanOptions, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Pictures"), ScanOptions::new(true));
//! let outcome = walker.scan().unwrap();
//! println!("Found {} files", outcome.files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::access::{AccessGate, AccessMode, FsAccessGate};
use super::{is_hidden_name, FileRef, ScanError, ScanOptions};
use crate::progress::ProgressCallback;

/// Prefix of every root-relative path.
pub const ROOT_PREFIX: &str = "./";

/// Build the root-relative path of `path` under `root`.
///
/// The result is `/`-separated and `./`-prefixed on every platform.
///
/// # Example
///
/// ```
/// use dupesweep::scanner::relative_path;
/// use std::path::Path;
///
/// let rel = relative_path(Path::new("/photos"), Path::new("/photos/sub/c.png"));
/// assert_eq!(rel, "./sub/c.png");
/// ```
#[must_use]
pub fn relative_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let joined = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    format!("{ROOT_PREFIX}{joined}")
}

/// Exact form of [`relative_path`]: `None` when any component of the path
/// is not valid UTF-8.
///
/// Lossy conversion can map two different names onto one string, so paths
/// that identify files for comparison or deletion use this form.
#[must_use]
pub fn utf8_relative_path(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let parts = relative
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(format!("{ROOT_PREFIX}{}", parts.join("/")))
}

/// Result of a completed scan.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Files found, in traversal order
    pub files: Vec<FileRef>,
    /// Non-fatal errors for subtrees or entries that were skipped
    pub errors: Vec<ScanError>,
    /// Whether the walk stopped early because shutdown was requested
    pub interrupted: bool,
}

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Scan options, captured once at construction
    options: ScanOptions,
    /// Authorization for each directory before descending
    gate: Arc<dyn AccessGate>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("options", &self.options)
            .field("shutdown_flag", &self.shutdown_flag)
            .finish_non_exhaustive()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `options` - Scan options
    #[must_use]
    pub fn new(path: &Path, options: ScanOptions) -> Self {
        Self {
            root: path.to_path_buf(),
            options,
            gate: Arc::new(FsAccessGate),
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Replace the default filesystem access gate.
    #[must_use]
    pub fn with_access_gate(mut self, gate: Arc<dyn AccessGate>) -> Self {
        self.gate = gate;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Report each discovered file to a progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn access_mode(&self) -> AccessMode {
        if self.options.require_write_access {
            AccessMode::Write
        } else {
            AccessMode::Read
        }
    }

    /// Build gitignore matcher from the configured patterns.
    fn build_gitignore(&self) -> Option<Gitignore> {
        if self.options.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.options.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Validate the root before walking. Root failures are fatal.
    fn check_root(&self) -> Result<(), ScanError> {
        let metadata =
            std::fs::metadata(&self.root).map_err(|e| ScanError::from_io(&self.root, &e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        self.gate.authorize(&self.root, self.access_mode())
    }

    /// Walk the directory tree and collect every eligible file.
    ///
    /// The walk is fully drained before this returns, so the outcome is
    /// final. Errors for individual subtrees are collected in
    /// [`ScanOutcome::errors`].
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] if the root itself cannot be used.
    pub fn scan(&self) -> Result<ScanOutcome, ScanError> {
        self.check_root()?;

        let gitignore = self.build_gitignore();
        let recursive = self.options.recursive;
        let mode = self.access_mode();
        let root = self.root.clone();
        let gate = Arc::clone(&self.gate);
        let denied: Arc<Mutex<Vec<ScanError>>> = Arc::new(Mutex::new(Vec::new()));
        let denied_in_walk = Arc::clone(&denied);

        log::debug!(
            "Scanning {} (recursive: {}, access: {})",
            self.root.display(),
            recursive,
            mode
        );

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .skip_hidden(true)
            .max_depth(if recursive { usize::MAX } else { 1 })
            .process_read_dir(move |_depth, _path, _read_dir_state, children| {
                children.retain(|child| match child {
                    Ok(entry) => {
                        let name = entry.file_name.to_string_lossy();
                        if is_hidden_name(&name) {
                            return false;
                        }
                        match &gitignore {
                            Some(gi) => {
                                let rel = relative_path(&root, &entry.path());
                                let rel = rel.trim_start_matches(ROOT_PREFIX);
                                !gi.matched(rel, entry.file_type().is_dir()).is_ignore()
                            }
                            None => true,
                        }
                    }
                    Err(_) => true,
                });

                // Sort children for deterministic output
                children.sort_by(|a, b| match (a, b) {
                    (Ok(a), Ok(b)) => a.file_name.cmp(&b.file_name),
                    (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                    (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                    (Err(_), Err(_)) => std::cmp::Ordering::Equal,
                });

                if !recursive {
                    return;
                }
                for entry in children.iter_mut().flatten() {
                    if !entry.file_type().is_dir() || entry.read_children_path.is_none() {
                        continue;
                    }
                    let dir = entry.path();
                    if let Err(e) = gate.authorize(&dir, mode) {
                        log::warn!("Skipping subtree {}: {}", dir.display(), e);
                        entry.read_children_path = None;
                        if let Ok(mut denied) = denied_in_walk.lock() {
                            denied.push(e);
                        }
                    }
                }
            });

        let mut outcome = ScanOutcome::default();

        for entry_result in walk_dir {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                outcome.interrupted = true;
                break;
            }

            match entry_result {
                Ok(entry) => {
                    if entry.depth == 0 {
                        continue;
                    }

                    let file_type = entry.file_type();
                    let path = entry.path();
                    if file_type.is_symlink() {
                        log::trace!("Skipping symlink: {}", path.display());
                        continue;
                    }
                    if !file_type.is_file() {
                        continue;
                    }

                    let Some(rel) = utf8_relative_path(&self.root, &path) else {
                        log::warn!("Skipping {}: name is not valid UTF-8", path.display());
                        outcome.errors.push(ScanError::NonUtf8Name(path));
                        continue;
                    };
                    let file = FileRef::new(rel, path);
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(outcome.files.len() + 1, &file.path);
                    }
                    outcome.files.push(file);
                }
                Err(e) => {
                    let path = e
                        .path()
                        .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                    let err = match e.io_error() {
                        Some(io) => ScanError::from_io(&path, io),
                        None => ScanError::Io {
                            path: path.clone(),
                            message: e.to_string(),
                        },
                    };
                    log::warn!("Walker error for {}: {}", path.display(), err);
                    outcome.errors.push(err);
                }
            }
        }

        if let Ok(mut denied) = denied.lock() {
            outcome.errors.append(&mut denied);
        }

        log::debug!(
            "Scan of {} found {} files ({} errors)",
            self.root.display(),
            outcome.files.len(),
            outcome.errors.len()
        );

        Ok(outcome)
    }
}
