//! Detection pipeline orchestration.
//!
//! [`DuplicateFinder`] runs the complete pipeline:
//! 1. **Scan** - Collect [`FileRef`]s from the target directory
//! 2. **Screen** - Stat every file and drop those with a unique size
//! 3. **Load** - Read each remaining file's content into memory
//! 4. **Bucket** - Group loaded files by exact size
//! 5. **Compare** - Pairwise byte comparison within buckets, merged into
//!    [`DuplicateSet`]s
//!
//! Content is dropped once the sets are formed; only paths and handles
//! survive in the result.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytesize::ByteSize;

use super::grouper::{DuplicateGrouper, MergePolicy};
use super::groups::{bucket_by_size, DuplicateSet};
use crate::progress::ProgressCallback;
use crate::scanner::loader::DEFAULT_IO_THREADS;
use crate::scanner::{
    AccessGate, ContentLoader, FileRef, FsAccessGate, LoadError, ScanError, ScanOptions, Walker,
};

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel loading.
    pub io_threads: usize,
    /// Fail the run on the first scan or read error.
    pub strict: bool,
    /// How equal pairs are merged into sets.
    pub merge_policy: MergePolicy,
    /// Directory scanning options.
    pub scan_options: ScanOptions,
    /// Directory authorization.
    pub access_gate: Arc<dyn AccessGate>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("merge_policy", &self.merge_policy)
            .field("scan_options", &self.scan_options)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "ProgressCallback"),
            )
            .finish_non_exhaustive()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            strict: false,
            merge_policy: MergePolicy::default(),
            scan_options: ScanOptions::default(),
            access_gate: Arc::new(FsAccessGate),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the number of I/O threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Enable strict mode (fail on first scan or read error).
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the merge policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    /// Set the scan options.
    #[must_use]
    pub fn with_scan_options(mut self, options: ScanOptions) -> Self {
        self.scan_options = options;
        self
    }

    /// Shorthand for toggling recursion on the scan options.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.scan_options.recursive = recursive;
        self
    }

    /// Replace the directory access gate.
    #[must_use]
    pub fn with_access_gate(mut self, gate: Arc<dyn AccessGate>) -> Self {
        self.access_gate = gate;
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
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
}

/// Statistics about a completed detection run.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Files discovered by the scanner
    pub total_files: usize,
    /// Files whose content was loaded
    pub loaded_files: usize,
    /// Combined size of every scanned file
    pub total_size: u64,
    /// Files sharing their size with another file
    pub candidate_files: usize,
    /// Byte comparisons performed
    pub comparisons: usize,
    /// Duplicate sets found
    pub duplicate_sets: usize,
    /// Redundant copies (set members beyond the first)
    pub duplicate_files: usize,
    /// Space freed by keeping one copy per set
    pub reclaimable_space: u64,
    /// Subtrees or entries that could not be scanned
    pub scan_errors: Vec<ScanError>,
    /// Files that could not be read
    pub load_errors: Vec<LoadError>,
    /// Wall-clock duration of the run
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Whether any non-fatal error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty() || !self.load_errors.is_empty()
    }

    /// Reclaimable space in human-readable form.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Total scanned size in human-readable form.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The run was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A scan error occurred (root access, or any error in strict mode).
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// A file could not be read (strict mode only).
    #[error(transparent)]
    Load(#[from] LoadError),
}

/// Duplicate finder that orchestrates the detection pipeline.
///
/// # Example
///
/// ```no_run
/// use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let finder = DuplicateFinder::new(FinderConfig::default().with_recursive(true));
/// let (sets, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate sets", sets.len());
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
#[derive(Debug, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::default()
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// Zero duplicate sets is a normal result, not an error.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The root cannot be accessed
    /// - Strict mode is on and any scan or read error occurred
    /// - The run is interrupted by shutdown signal
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        log::info!(
            "Starting duplicate scan of {} (recursive: {})",
            path.display(),
            self.config.scan_options.recursive
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("scanning", 0);
        }

        let mut walker = Walker::new(path, self.config.scan_options.clone())
            .with_access_gate(Arc::clone(&self.config.access_gate));
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(Arc::clone(callback));
        }

        let outcome = walker.scan()?;

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("scanning");
        }

        if outcome.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(first) = outcome.errors.first() {
            if self.config.strict {
                return Err(FinderError::Scan(first.clone()));
            }
        }

        log::info!("Found {} files", outcome.files.len());

        let (sets, mut summary) = self.find_duplicates_from_files(outcome.files)?;
        summary.scan_errors = outcome.errors;
        summary.scan_duration = start_time.elapsed();
        Ok((sets, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Load` in strict mode when a file cannot be
    /// read, and `FinderError::Interrupted` on shutdown.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileRef>,
    ) -> Result<(Vec<DuplicateSet>, ScanSummary), FinderError> {
        let start_time = std::time::Instant::now();
        let mut summary = ScanSummary {
            total_files: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            log::info!("No files to compare, scan complete");
            summary.scan_duration = start_time.elapsed();
            return Ok((Vec::new(), summary));
        }

        let mut loader = ContentLoader::new().with_io_threads(self.config.io_threads);
        if let Some(ref flag) = self.config.shutdown_flag {
            loader = loader.with_shutdown_flag(Arc::clone(flag));
        }
        if let Some(ref callback) = self.config.progress_callback {
            loader = loader.with_progress_callback(Arc::clone(callback));
        }

        let screen = loader.screen_sizes(files);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        if let Some(first) = screen.errors.first() {
            if self.config.strict {
                return Err(FinderError::Load(first.clone()));
            }
        }

        summary.total_size = screen.total_size;
        summary.candidate_files = screen.candidates.len();
        summary.load_errors = screen.errors;

        let (loaded, load_errors) = loader.load_all(&screen.candidates);

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }
        if let Some(first) = load_errors.first() {
            if self.config.strict {
                return Err(FinderError::Load(first.clone()));
            }
        }

        summary.loaded_files = loaded.len();
        summary.load_errors.extend(load_errors);

        let (buckets, _) = bucket_by_size(loaded);

        let mut grouper = DuplicateGrouper::new(self.config.merge_policy);
        if let Some(ref flag) = self.config.shutdown_flag {
            grouper = grouper.with_shutdown_flag(Arc::clone(flag));
        }
        if let Some(ref callback) = self.config.progress_callback {
            grouper = grouper.with_progress_callback(Arc::clone(callback));
        }

        let grouped = grouper.group(&buckets);
        drop(buckets);

        if grouped.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.comparisons = grouped.comparisons;
        summary.duplicate_sets = grouped.sets.len();
        summary.duplicate_files = grouped.sets.iter().map(DuplicateSet::duplicate_count).sum();
        summary.reclaimable_space = grouped.sets.iter().map(DuplicateSet::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete: {} duplicate sets, {} duplicate files, {} reclaimable",
            summary.duplicate_sets,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((grouped.sets, summary))
    }
}
