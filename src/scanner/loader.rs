//! Whole-file content loading.
//!
//! # Overview
//!
//! Comparison is a direct byte scan, so every candidate file is read into
//! memory in full. [`ContentLoader::load`] is a single "read whole file"
//! operation; partial reads are never exposed.
//!
//! [`ContentLoader::screen_sizes`] stats every file first and keeps only
//! those whose size is shared with another file, so a file that cannot be a
//! duplicate is never opened.
//!
//! [`ContentLoader::load_all`] loads a batch on a bounded rayon pool. A file
//! that cannot be read is logged, left out of the output, and its error is
//! returned alongside the loaded files so the caller can decide whether the
//! run should fail.

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use super::{FileRef, LoadError};
use crate::progress::ProgressCallback;

/// Default number of I/O threads for loading.
pub const DEFAULT_IO_THREADS: usize = 4;

/// A scanned file together with its full content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    /// The scanned entry this content belongs to
    pub file: FileRef,
    /// Content length in bytes
    pub size: u64,
    /// Entire file content
    pub bytes: Vec<u8>,
}

impl LoadedFile {
    /// Build a loaded file from an entry and its content.
    #[must_use]
    pub fn new(file: FileRef, bytes: Vec<u8>) -> Self {
        Self {
            file,
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// Root-relative path of the file.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.file.path
    }
}

/// Outcome of the metadata size pre-screen.
#[derive(Debug, Default)]
pub struct SizeScreen {
    /// Files sharing their size with at least one other file, in input order
    pub candidates: Vec<FileRef>,
    /// Files with a size no other file has
    pub unique_files: usize,
    /// Combined size of every file whose metadata was read
    pub total_size: u64,
    /// Files whose metadata could not be read
    pub errors: Vec<LoadError>,
}

fn load_error(path: &str, e: &io::Error) -> LoadError {
    match e.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound(path.to_string()),
        io::ErrorKind::PermissionDenied => LoadError::PermissionDenied(path.to_string()),
        _ => LoadError::Io {
            path: path.to_string(),
            message: e.to_string(),
        },
    }
}

/// Reads file contents for comparison.
#[derive(Clone)]
pub struct ContentLoader {
    io_threads: usize,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ContentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentLoader")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "ProgressCallback"),
            )
            .finish()
    }
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentLoader {
    /// Create a loader with the default thread count.
    #[must_use]
    pub fn new() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the number of I/O threads (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
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

    /// Read the entire content of one file.
    ///
    /// # Errors
    ///
    /// Returns a [`LoadError`] if the file cannot be opened or read.
    pub fn load(&self, file: &FileRef) -> Result<LoadedFile, LoadError> {
        let bytes = std::fs::read(&file.handle).map_err(|e| load_error(&file.path, &e))?;

        log::trace!("Loaded {} ({} bytes)", file.path, bytes.len());
        Ok(LoadedFile::new(file.clone(), bytes))
    }

    /// Run `op` on a pool bounded to `io_threads`, or on the global pool if
    /// one cannot be built.
    fn on_pool<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.io_threads)
            .build()
        {
            Ok(pool) => pool.install(op),
            Err(e) => {
                log::warn!(
                    "Failed to create loader thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                op()
            }
        }
    }

    /// Stat every file and keep those whose size another file shares.
    ///
    /// Only metadata is read here. Files whose metadata cannot be read are
    /// reported in [`SizeScreen::errors`] and dropped.
    #[must_use]
    pub fn screen_sizes(&self, files: Vec<FileRef>) -> SizeScreen {
        let sizes: Vec<Result<u64, LoadError>> = self.on_pool(|| {
            files
                .par_iter()
                .map(|file| {
                    if self.is_shutdown_requested() {
                        return Err(LoadError::Interrupted(file.path.clone()));
                    }
                    std::fs::metadata(&file.handle)
                        .map(|m| m.len())
                        .map_err(|e| load_error(&file.path, &e))
                })
                .collect()
        });

        let mut counts: HashMap<u64, usize> = HashMap::new();
        for size in sizes.iter().flatten() {
            *counts.entry(*size).or_default() += 1;
        }

        let mut screen = SizeScreen::default();
        for (file, size) in files.into_iter().zip(sizes) {
            match size {
                Ok(size) => {
                    screen.total_size += size;
                    if counts.get(&size).copied().unwrap_or(0) > 1 {
                        screen.candidates.push(file);
                    } else {
                        screen.unique_files += 1;
                    }
                }
                Err(LoadError::Interrupted(path)) => {
                    screen.errors.push(LoadError::Interrupted(path));
                }
                Err(e) => {
                    log::warn!("Failed to stat {}: {}", e.path(), e);
                    screen.errors.push(e);
                }
            }
        }

        log::debug!(
            "Size screen: {} candidates, {} unique sizes skipped, {} failed",
            screen.candidates.len(),
            screen.unique_files,
            screen.errors.len()
        );

        screen
    }

    /// Load a batch of files in parallel, preserving input order.
    ///
    /// Failed files are excluded from the first element of the result and
    /// their errors are returned in the second. Progress counts follow
    /// completion order, not input order.
    #[must_use]
    pub fn load_all(&self, files: &[FileRef]) -> (Vec<LoadedFile>, Vec<LoadError>) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("loading", files.len());
        }

        let started = AtomicUsize::new(0);
        let results: Vec<Result<LoadedFile, LoadError>> = self.on_pool(|| {
            files
                .par_iter()
                .map(|file| {
                    if self.is_shutdown_requested() {
                        return Err(LoadError::Interrupted(file.path.clone()));
                    }
                    if let Some(ref callback) = self.progress_callback {
                        let current = started.fetch_add(1, Ordering::SeqCst) + 1;
                        callback.on_progress(current, &file.path);
                    }
                    let result = self.load(file);
                    if let (Ok(loaded), Some(callback)) = (&result, &self.progress_callback) {
                        callback.on_item_completed(loaded.size);
                    }
                    result
                })
                .collect()
        });

        let mut loaded = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(file) => loaded.push(file),
                Err(LoadError::Interrupted(path)) => {
                    log::trace!("Skipped loading {} after shutdown request", path);
                    errors.push(LoadError::Interrupted(path));
                }
                Err(e) => {
                    log::warn!("Failed to read {}: {}", e.path(), e);
                    errors.push(e);
                }
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("loading");
        }

        log::debug!(
            "Loaded {} of {} files ({} failed)",
            loaded.len(),
            files.len(),
            errors.len()
        );

        (loaded, errors)
    }
}
