//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based bucketing of loaded files
//! - Byte-exact comparison
//! - Merging equal pairs into duplicate sets (union-find or first-match)
//! - Pipeline orchestration from directory to duplicate sets

pub mod compare;
pub mod finder;
pub mod grouper;
pub mod groups;
pub mod union_find;

pub use compare::bytes_equal;
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanSummary};
pub use grouper::{group_duplicates, DuplicateGrouper, GroupOutcome, MergePolicy};
pub use groups::{bucket_by_size, BucketStats, DuplicateSet, SizeBuckets};
pub use union_find::DisjointSet;
