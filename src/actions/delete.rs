//! Selective, tree-aware file deletion.
//!
//! # Overview
//!
//! [`delete_selected`] re-walks the scanned root and removes exactly the
//! files whose root-relative path is in the caller's selection:
//! - Every non-hidden directory is descended into, whatever the recursion
//!   flag of the earlier scan was
//! - Write access is authorized for each directory before descending
//! - Directories themselves are never removed
//! - Selected paths that no longer exist are no-ops, reported as missing
//! - One failing path does not abort the rest of the batch
//!
//! Files are removed permanently by default, or moved to the system trash
//! when [`DeleteConfig::trash`] is set.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::{delete_selected, DeleteConfig};
//! use dupesweep::scanner::FsAccessGate;
//! use std::collections::HashSet;
//! use std::path::Path;
//!
//! let selection: HashSet<String> = ["./copy.png".to_string()].into_iter().collect();
//! let result = delete_selected(
//!     Path::new("/photos"),
//!     &selection,
//!     &DeleteConfig::default(),
//!     &FsAccessGate,
//!     None,
//! )
//! .unwrap();
//! println!("{}", result.summary());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use walkdir::WalkDir;

use crate::duplicates::DuplicateSet;
use crate::scanner::{is_hidden_name, relative_path, utf8_relative_path, AccessGate, AccessMode};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The access gate refused write access to a directory.
    #[error("write access not authorized for {path}: {reason}")]
    AccessDenied { path: PathBuf, reason: String },

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Removing the file failed.
    #[error("remove failed for {path}: {message}")]
    RemoveFailed { path: PathBuf, message: String },

    /// The selection would remove every member of a duplicate set.
    #[error("cannot delete all copies of {0} - at least one file must be preserved")]
    AllCopiesWouldBeDeleted(String),

    /// The root directory cannot be walked or written.
    #[error("cannot use {path} for deletion: {message}")]
    RootUnavailable { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::AccessDenied { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::RemoveFailed { path: p, .. }
            | Self::RootUnavailable { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::AllCopiesWouldBeDeleted(_) => None,
        }
    }

    fn from_metadata(path: &Path, e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: e,
            },
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResult {
    /// Root-relative path that was removed.
    pub path: String,
    /// Size of the removed file in bytes.
    pub size: u64,
    /// Whether the file went to the trash rather than being removed.
    pub trashed: bool,
}

/// Results of a selective deletion pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchDeleteResult {
    /// Successfully removed files.
    pub successes: Vec<DeleteResult>,
    /// Failed paths with their error messages.
    pub failures: Vec<(String, String)>,
    /// Selected paths that were never encountered.
    pub missing: Vec<String>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of successful deletions.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failed deletions.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Check if all deletions succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable summary of the operation.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Deleted {} file(s), freed {}",
            self.success_count(),
            bytesize::ByteSize(self.bytes_freed)
        );
        if !self.all_succeeded() {
            summary.push_str(&format!(", {} failed", self.failure_count()));
        }
        if !self.missing.is_empty() {
            summary.push_str(&format!(", {} not found", self.missing.len()));
        }
        summary
    }
}

/// Configuration for deletion operations.
#[derive(Debug, Clone)]
pub struct DeleteConfig {
    /// Move files to the system trash instead of removing them.
    pub trash: bool,
    /// Continue on error (process remaining files even if some fail).
    pub continue_on_error: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self {
            trash: false,
            continue_on_error: true,
        }
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            trash: true,
            ..Self::default()
        }
    }

    /// Enable/disable continue on error.
    #[must_use]
    pub fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &str);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &str, size: u64);

    /// Called after failed deletion.
    fn on_delete_failure(&self, path: &str, error: &str);

    /// Called when the pass completes.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<u64, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Permanently remove a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if the file cannot be inspected
/// - `RemoveFailed` if the remove operation fails
pub fn permanent_delete(path: &Path) -> Result<u64, DeleteError> {
    let size = fs::metadata(path)
        .map_err(|e| DeleteError::from_metadata(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::error!("Remove failed for {}: {}", path.display(), e);
        DeleteError::RemoveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Deleted: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Remove every file under `root` whose root-relative path is selected.
///
/// # Errors
///
/// Returns `RootUnavailable` if `root` is missing, not a directory, or not
/// writable. Every other failure is recorded per path in the result.
pub fn delete_selected(
    root: &Path,
    selection: &HashSet<String>,
    config: &DeleteConfig,
    gate: &dyn AccessGate,
    callback: Option<&dyn DeleteProgressCallback>,
) -> Result<BatchDeleteResult, DeleteError> {
    let root_unavailable = |message: String| DeleteError::RootUnavailable {
        path: root.to_path_buf(),
        message,
    };

    let metadata = fs::metadata(root).map_err(|e| root_unavailable(e.to_string()))?;
    if !metadata.is_dir() {
        return Err(root_unavailable("not a directory".to_string()));
    }
    gate.authorize(root, AccessMode::Write)
        .map_err(|e| root_unavailable(e.to_string()))?;

    log::info!(
        "Deleting {} selected file(s) under {}",
        selection.len(),
        root.display()
    );

    let mut result = BatchDeleteResult::default();
    let mut pending: HashSet<&str> = selection.iter().map(String::as_str).collect();
    let mut denied: Vec<(String, String)> = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            if is_hidden_name(&entry.file_name().to_string_lossy()) {
                return false;
            }
            if !entry.file_type().is_dir() {
                return true;
            }
            match gate.authorize(entry.path(), AccessMode::Write) {
                Ok(()) => true,
                Err(e) => {
                    let rel = relative_path(root, entry.path());
                    let inside = format!("{rel}/");
                    if selection.iter().any(|p| p.starts_with(&inside)) {
                        log::warn!("Not descending into {}: {}", entry.path().display(), e);
                        denied.push((rel, e.to_string()));
                    } else {
                        log::debug!("Not descending into {}: {}", entry.path().display(), e);
                    }
                    false
                }
            }
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root);
                log::warn!("Walker error for {}: {}", path.display(), e);
                result
                    .failures
                    .push((relative_path(root, path), e.to_string()));
                if !config.continue_on_error {
                    break;
                }
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = utf8_relative_path(root, entry.path()) else {
            log::debug!("Keeping {}: name is not valid UTF-8", entry.path().display());
            continue;
        };
        if !pending.remove(rel.as_str()) {
            log::trace!("Keeping {}", rel);
            continue;
        }

        if let Some(cb) = callback {
            cb.on_before_delete(&rel);
        }

        let outcome = if config.trash {
            delete_to_trash(entry.path())
        } else {
            permanent_delete(entry.path())
        };

        match outcome {
            Ok(size) => {
                result.bytes_freed += size;
                if let Some(cb) = callback {
                    cb.on_delete_success(&rel, size);
                }
                result.successes.push(DeleteResult {
                    path: rel,
                    size,
                    trashed: config.trash,
                });
            }
            Err(DeleteError::NotFound(_)) => {
                log::debug!("{} vanished before deletion", rel);
                result.missing.push(rel);
            }
            Err(e) => {
                let message = e.to_string();
                log::warn!("Failed to delete {}: {}", rel, message);
                if let Some(cb) = callback {
                    cb.on_delete_failure(&rel, &message);
                }
                result.failures.push((rel, message));
                if !config.continue_on_error {
                    log::info!("Stopping deletion due to error (continue_on_error=false)");
                    break;
                }
            }
        }
    }

    result.failures.extend(denied);

    let mut missing: Vec<String> = pending.into_iter().map(str::to_string).collect();
    missing.sort();
    for path in &missing {
        log::debug!("Selected path not found under root: {}", path);
    }
    result.missing.extend(missing);

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{}", result.summary());

    Ok(result)
}

/// Validate that a selection keeps at least one member of every set.
///
/// # Errors
///
/// Returns `AllCopiesWouldBeDeleted` naming the first member of the first
/// set that would be emptied.
///
/// # Example
///
/// ```
/// use dupesweep::actions::delete::validate_selection;
/// use dupesweep::duplicates::DuplicateSet;
/// use dupesweep::scanner::FileRef;
/// use std::collections::HashSet;
///
/// let sets = vec![DuplicateSet::new(
///     3,
///     vec![FileRef::new("./x.png", "/r/x.png"), FileRef::new("./y.png", "/r/y.png")],
/// )];
///
/// let keep_one: HashSet<String> = ["./y.png".to_string()].into_iter().collect();
/// assert!(validate_selection(&sets, &keep_one).is_ok());
///
/// let all: HashSet<String> = ["./x.png", "./y.png"].iter().map(|s| s.to_string()).collect();
/// assert!(validate_selection(&sets, &all).is_err());
/// ```
pub fn validate_selection(
    sets: &[DuplicateSet],
    selection: &HashSet<String>,
) -> Result<(), DeleteError> {
    for set in sets {
        let preserved = set
            .members
            .iter()
            .filter(|m| !selection.contains(&m.path))
            .count();

        if preserved == 0 {
            log::error!(
                "Selection would delete all {} copies of a duplicate set",
                set.len()
            );
            let first = set.members.first().map(|m| m.path.clone()).unwrap_or_default();
            return Err(DeleteError::AllCopiesWouldBeDeleted(first));
        }
    }

    log::debug!(
        "Selection validated: {} paths across {} sets",
        selection.len(),
        sets.len()
    );
    Ok(())
}
