//! Pairwise comparison and equivalence-class merging.
//!
//! # Overview
//!
//! Within each size bucket every unordered pair `(i, j)`, `i < j`, is a
//! candidate. Equal pairs are merged into [`DuplicateSet`]s according to a
//! [`MergePolicy`]:
//!
//! - [`MergePolicy::UnionFind`] unions both files in a [`DisjointSet`] and
//!   flattens the classes at the end. A file already merged into an earlier
//!   file's class is not compared again as a left-hand side; its equal
//!   partners are reached through that earlier file.
//! - [`MergePolicy::FirstMatch`] scans the existing sets linearly and
//!   extends the first one that holds either file. It compares every pair.
//!
//! Comparisons for one left-hand file run in parallel; merges are applied
//! in pair order afterwards, so results do not depend on thread timing.
//!
//! Ordering: sets appear in the order they were first created (buckets in
//! ascending size); members appear in the order they were discovered.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::compare::bytes_equal;
use super::groups::{DuplicateSet, SizeBuckets};
use super::union_find::DisjointSet;
use crate::progress::ProgressCallback;
use crate::scanner::LoadedFile;

/// How equal pairs are merged into duplicate sets.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Disjoint-set union with path compression
    #[default]
    UnionFind,
    /// Extend the first existing set that holds either file
    FirstMatch,
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergePolicy::UnionFind => write!(f, "union-find"),
            MergePolicy::FirstMatch => write!(f, "first-match"),
        }
    }
}

/// Result of grouping a set of buckets.
#[derive(Debug, Clone, Default)]
pub struct GroupOutcome {
    /// Confirmed duplicate sets
    pub sets: Vec<DuplicateSet>,
    /// Number of byte comparisons performed
    pub comparisons: usize,
    /// Whether grouping stopped early because shutdown was requested
    pub interrupted: bool,
}

/// Compares files within size buckets and builds duplicate sets.
#[derive(Clone, Default)]
pub struct DuplicateGrouper {
    policy: MergePolicy,
    shutdown_flag: Option<Arc<AtomicBool>>,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for DuplicateGrouper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateGrouper")
            .field("policy", &self.policy)
            .field("shutdown_flag", &self.shutdown_flag)
            .finish_non_exhaustive()
    }
}

impl DuplicateGrouper {
    /// Create a grouper with the given merge policy.
    #[must_use]
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
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

    /// Compare and merge every bucket with two or more files.
    #[must_use]
    pub fn group(&self, buckets: &SizeBuckets) -> GroupOutcome {
        let candidates: Vec<(&u64, &Vec<LoadedFile>)> =
            buckets.iter().filter(|(_, files)| files.len() > 1).collect();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("comparing", candidates.len());
        }

        let mut outcome = GroupOutcome::default();

        for (idx, (size, files)) in candidates.into_iter().enumerate() {
            if self.is_shutdown_requested() {
                log::debug!("Grouper: Shutdown requested, stopping comparison");
                outcome.interrupted = true;
                break;
            }
            if let Some(ref callback) = self.progress_callback {
                callback.on_progress(idx + 1, &format!("{size} byte files"));
            }

            let (classes, comparisons) = match self.policy {
                MergePolicy::UnionFind => self.merge_union_find(files),
                MergePolicy::FirstMatch => self.merge_first_match(files),
            };
            outcome.comparisons += comparisons;

            for class in classes {
                let members = class.into_iter().map(|i| files[i].file.clone()).collect();
                let set = DuplicateSet::new(*size, members);
                log::debug!(
                    "Duplicate set of {} files, {} bytes each: {}",
                    set.len(),
                    size,
                    set.paths().join(", ")
                );
                outcome.sets.push(set);
            }
        }

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("comparing");
        }

        log::info!(
            "Comparison complete: {} duplicate sets from {} comparisons ({})",
            outcome.sets.len(),
            outcome.comparisons,
            self.policy
        );

        outcome
    }

    /// Indices `j > i` whose content equals `files[i]`, ascending.
    fn equal_row(files: &[LoadedFile], i: usize, skip: &[bool]) -> (Vec<usize>, usize) {
        let candidates: Vec<usize> = (i + 1..files.len()).filter(|&j| !skip[j]).collect();
        let compared = candidates.len();
        let row = candidates
            .into_par_iter()
            .filter(|&j| bytes_equal(&files[i].bytes, &files[j].bytes))
            .collect();
        (row, compared)
    }

    fn merge_union_find(&self, files: &[LoadedFile]) -> (Vec<Vec<usize>>, usize) {
        let n = files.len();
        let mut ds = DisjointSet::new(n);
        let mut merged = vec![false; n];
        let mut discovered: Vec<Option<usize>> = vec![None; n];
        let mut next_seq = 0usize;
        let mut comparisons = 0usize;

        for i in 0..n {
            if merged[i] {
                continue;
            }
            if self.is_shutdown_requested() {
                break;
            }

            let (row, compared) = Self::equal_row(files, i, &merged);
            comparisons += compared;

            for j in row {
                for idx in [i, j] {
                    if discovered[idx].is_none() {
                        discovered[idx] = Some(next_seq);
                        next_seq += 1;
                    }
                }
                ds.union(i, j);
                merged[j] = true;
            }
        }

        let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
        for idx in 0..n {
            if discovered[idx].is_some() {
                let root = ds.find(idx);
                by_root.entry(root).or_default().push(idx);
            }
        }

        let seq = |idx: &usize| discovered[*idx].unwrap_or(usize::MAX);
        let mut classes: Vec<Vec<usize>> = by_root
            .into_values()
            .filter(|members| members.len() > 1)
            .map(|mut members| {
                members.sort_by_key(seq);
                members
            })
            .collect();
        classes.sort_by_key(|members| members.first().map_or(usize::MAX, seq));

        (classes, comparisons)
    }

    fn merge_first_match(&self, files: &[LoadedFile]) -> (Vec<Vec<usize>>, usize) {
        let n = files.len();
        let no_skip = vec![false; n];
        let mut sets: Vec<Vec<usize>> = Vec::new();
        let mut comparisons = 0usize;

        for i in 0..n {
            if self.is_shutdown_requested() {
                break;
            }

            let (row, compared) = Self::equal_row(files, i, &no_skip);
            comparisons += compared;

            for j in row {
                if sets.iter().any(|s| s.contains(&i) && s.contains(&j)) {
                    continue;
                }
                if let Some(set) = sets.iter_mut().find(|s| s.contains(&i) || s.contains(&j)) {
                    let missing = if set.contains(&i) { j } else { i };
                    set.push(missing);
                } else {
                    sets.push(vec![i, j]);
                }
            }
        }

        (sets, comparisons)
    }
}

/// Group buckets with the given policy.
///
/// # Example
///
/// ```
/// use dupesweep::duplicates::{bucket_by_size, group_duplicates, MergePolicy};
/// use dupesweep::scanner::{FileRef, LoadedFile};
///
/// let files = vec![
///     LoadedFile::new(FileRef::new("./x.png", "/r/x.png"), vec![1, 2, 3]),
///     LoadedFile::new(FileRef::new("./y.png", "/r/y.png"), vec![1, 2, 3]),
///     LoadedFile::new(FileRef::new("./z.png", "/r/z.png"), vec![1, 2, 4]),
/// ];
/// let (buckets, _) = bucket_by_size(files);
///
/// let sets = group_duplicates(&buckets, MergePolicy::UnionFind);
/// assert_eq!(sets.len(), 1);
/// assert_eq!(sets[0].paths(), vec!["./x.png", "./y.png"]);
/// ```
#[must_use]
pub fn group_duplicates(buckets: &SizeBuckets, policy: MergePolicy) -> Vec<DuplicateSet> {
    DuplicateGrouper::new(policy).group(buckets).sets
}
