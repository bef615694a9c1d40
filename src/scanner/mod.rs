//! Scanner module for directory traversal and content loading.
//!
//! This module provides functionality for:
//! - Directory walking using jwalk, with hidden-entry and pattern exclusion
//! - Access authorization before descending into subdirectories
//! - Loading whole file contents for byte-exact comparison
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`access`]: Directory authorization (read or write)
//! - [`loader`]: Whole-file content loading
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{ScanOptions, Walker};
//! use std::path::Path;
//!
//! let options = ScanOptions {
//!     recursive: true,
//!     ..Default::default()
//! };
//!
//! let outcome = Walker::new(Path::new("."), options).scan().unwrap();
//! for file in &outcome.files {
//!     println!("{}", file.path);
//! }
//! for err in &outcome.errors {
//!     eprintln!("Warning: {}", err);
//! }
//! ```

pub mod access;
pub mod loader;
pub mod walker;

use std::path::{Path, PathBuf};

use serde::Serialize;

// Re-export main types
pub use access::{AccessGate, AccessMode, FsAccessGate};
pub use loader::{ContentLoader, LoadedFile, SizeScreen};
pub use walker::{relative_path, utf8_relative_path, ScanOutcome, Walker, ROOT_PREFIX};

/// Reference to one file within the scanned tree.
///
/// `path` is the stable identity used for selection and deletion;
/// `handle` is where the file actually lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FileRef {
    /// Root-relative path, `/`-separated and `./`-prefixed
    pub path: String,
    /// Filesystem location used to read or delete the entry
    #[serde(skip)]
    pub handle: PathBuf,
}

impl FileRef {
    /// Create a new FileRef.
    ///
    /// # Arguments
    ///
    /// * `path` - Root-relative path (e.g. `./sub/c.png`)
    /// * `handle` - Location of the file on disk
    #[must_use]
    pub fn new(path: impl Into<String>, handle: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            handle: handle.into(),
        }
    }

    /// Final component of the relative path.
    #[must_use]
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Configuration for directory scanning.
///
/// The recursion flag is captured once here and never re-read while a
/// walk is in progress.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Descend into non-hidden subdirectories.
    pub recursive: bool,

    /// Ask for write authorization on each subdirectory before descending.
    /// Set when the scan precedes a deletion.
    pub require_write_access: bool,

    /// Glob patterns to ignore (gitignore-style), relative to the root.
    pub ignore_patterns: Vec<String>,
}

impl ScanOptions {
    /// Create scan options with the given recursion flag.
    #[must_use]
    pub fn new(recursive: bool) -> Self {
        Self {
            recursive,
            ..Default::default()
        }
    }

    /// Add ignore patterns.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Require write authorization before descending.
    #[must_use]
    pub fn with_write_access(mut self, require: bool) -> Self {
        self.require_write_access = require;
        self
    }
}

/// Check whether a file or directory name is hidden (starts with `.`).
#[must_use]
pub fn is_hidden_name(name: &str) -> bool {
    name.starts_with('.')
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug, Clone)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The access gate refused to authorize a directory.
    #[error("Access not authorized for {path}: {reason}")]
    AccessDenied {
        /// Directory that was refused
        path: PathBuf,
        /// Why authorization failed
        reason: String,
    },

    /// A file name is not valid UTF-8 and has no exact root-relative path.
    #[error("File name is not valid UTF-8: {0}")]
    NonUtf8Name(PathBuf),

    /// An I/O error occurred while accessing a directory.
    #[error("I/O error for {path}: {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error message
        message: String,
    },
}

impl ScanError {
    /// Classify an I/O error for the given path.
    #[must_use]
    pub fn from_io(path: &Path, error: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }

    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(p)
            | Self::NotFound(p)
            | Self::NotADirectory(p)
            | Self::NonUtf8Name(p) => p,
            Self::AccessDenied { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// Errors that can occur while loading file contents.
#[derive(thiserror::Error, Debug, Clone)]
pub enum LoadError {
    /// The file disappeared between scanning and loading.
    #[error("File not found: {0}")]
    NotFound(String),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {message}")]
    Io {
        /// Root-relative path of the file
        path: String,
        /// The underlying I/O error message
        message: String,
    },

    /// Loading was skipped because shutdown was requested.
    #[error("Loading interrupted: {0}")]
    Interrupted(String),
}

impl LoadError {
    /// Root-relative path of the file that failed to load.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Interrupted(p) => p,
            Self::Io { path, .. } => path,
        }
    }
}
