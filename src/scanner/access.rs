//! Directory authorization.
//!
//! Before a walker descends into a subdirectory it asks an [`AccessGate`]
//! whether it may do so. Scans ask for [`AccessMode::Read`] unless the scan
//! precedes a deletion, in which case (as for the deleter itself)
//! [`AccessMode::Write`] is required.
//!
//! The default gate, [`FsAccessGate`], consults the filesystem. Callers that
//! front the scanner with an interactive permission flow can plug in their
//! own implementation.

use std::fmt;
use std::path::Path;

use super::ScanError;

/// Level of access requested for a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// List the directory's children.
    Read,
    /// Remove entries from the directory.
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// Authorizes descent into a directory.
pub trait AccessGate: Send + Sync {
    /// Grant or refuse `mode` access to `dir`.
    ///
    /// # Errors
    ///
    /// Returns a [`ScanError`] describing why access was refused.
    fn authorize(&self, dir: &Path, mode: AccessMode) -> Result<(), ScanError>;
}

/// Access gate backed by filesystem metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsAccessGate;

impl AccessGate for FsAccessGate {
    fn authorize(&self, dir: &Path, mode: AccessMode) -> Result<(), ScanError> {
        let metadata = std::fs::metadata(dir).map_err(|e| ScanError::from_io(dir, &e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(dir.to_path_buf()));
        }

        // Opening the directory is the only reliable readability check.
        std::fs::read_dir(dir).map_err(|e| ScanError::from_io(dir, &e))?;

        if mode == AccessMode::Write && metadata.permissions().readonly() {
            log::debug!("Write access refused for read-only {}", dir.display());
            return Err(ScanError::AccessDenied {
                path: dir.to_path_buf(),
                reason: "directory is read-only".to_string(),
            });
        }

        log::trace!("Authorized {} access to {}", mode, dir.display());
        Ok(())
    }
}
