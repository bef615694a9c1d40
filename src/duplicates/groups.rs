//! Size bucketing and duplicate set types.
//!
//! # Overview
//!
//! Files with different sizes cannot be byte-identical, so the first step of
//! detection groups loaded files by exact size. Only buckets with two or more
//! members go on to pairwise comparison.
//!
//! # Example
//!
//! ```
//! use dupesweep::duplicates::bucket_by_size;
//! use dupesweep::scanner::{FileRef, LoadedFile};
//!
//! let files = vec![
//!     LoadedFile::new(FileRef::new("./a.png", "/r/a.png"), vec![1, 2, 3]),
//!     LoadedFile::new(FileRef::new("./b.png", "/r/b.png"), vec![1, 2, 3]),
//!     LoadedFile::new(FileRef::new("./c.png", "/r/c.png"), vec![9]),
//! ];
//!
//! let (buckets, stats) = bucket_by_size(files);
//!
//! assert_eq!(buckets.len(), 2);
//! assert_eq!(buckets[&3].len(), 2);
//! assert_eq!(stats.candidate_files, 2);
//! ```

use std::collections::BTreeMap;

use bytesize::ByteSize;
use serde::Serialize;

use crate::scanner::{FileRef, LoadedFile};

/// Loaded files keyed by exact size, ascending. Members keep scan order.
pub type SizeBuckets = BTreeMap<u64, Vec<LoadedFile>>;

/// A confirmed set of byte-identical files.
///
/// Invariants: at least two members, all members share `size` and content,
/// and no path appears in more than one set of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateSet {
    /// Size in bytes shared by every member
    pub size: u64,
    /// Members in discovery order
    pub members: Vec<FileRef>,
}

impl DuplicateSet {
    /// Create a new duplicate set.
    #[must_use]
    pub fn new(size: u64, members: Vec<FileRef>) -> Self {
        Self { size, members }
    }

    /// Number of files in this set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Check if this set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Check whether `path` is a member of this set.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.members.iter().any(|m| m.path == path)
    }

    /// Root-relative paths of the members.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.path.as_str()).collect()
    }

    /// Number of redundant copies (all but one).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    /// Space freed by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Statistics from the size bucketing step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketStats {
    /// Total number of files bucketed
    pub total_files: usize,
    /// Total size of all files in bytes
    pub total_size: u64,
    /// Number of distinct sizes
    pub unique_sizes: usize,
    /// Files sharing their size with at least one other file
    pub candidate_files: usize,
    /// Buckets with 2+ files
    pub candidate_buckets: usize,
}

impl BucketStats {
    /// Percentage of files ruled out by size alone.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            ((self.total_files - self.candidate_files) as f64 / self.total_files as f64) * 100.0
        }
    }
}

/// Group loaded files by exact size.
///
/// Every input lands in exactly one bucket, singletons included; the
/// grouper skips buckets that cannot hold a duplicate.
///
/// # Performance
///
/// - Time complexity: O(n log s) for n files and s distinct sizes
/// - No file I/O is performed
#[must_use]
pub fn bucket_by_size(files: impl IntoIterator<Item = LoadedFile>) -> (SizeBuckets, BucketStats) {
    let mut buckets = SizeBuckets::new();
    let mut stats = BucketStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        buckets.entry(file.size).or_default().push(file);
    }

    stats.unique_sizes = buckets.len();
    for (size, files) in &buckets {
        if files.len() > 1 {
            stats.candidate_files += files.len();
            stats.candidate_buckets += 1;
            log::debug!("Size bucket {} bytes: {} candidates", size, files.len());
        }
    }

    log::info!(
        "Bucketed {} files ({}) into {} sizes, {} candidates ({:.1}% eliminated)",
        stats.total_files,
        ByteSize(stats.total_size),
        stats.unique_sizes,
        stats.candidate_files,
        stats.elimination_rate()
    );

    (buckets, stats)
}
