//! File actions module.
//!
//! # Deletion
//!
//! The delete module removes a selection of duplicate files from a
//! previously scanned directory tree:
//! - Permanent removal (default) or move to the system trash
//! - Write authorization per directory before descending
//! - Per-path failures that do not abort the batch
//! - Selection validation so every duplicate set keeps one copy
//!
//! ```no_run
//! use dupesweep::actions::delete::permanent_delete;
//! use std::path::PathBuf;
//!
//! let path = PathBuf::from("/path/to/duplicate.png");
//! let result = permanent_delete(&path);
//! ```

pub mod delete;

pub use delete::{
    delete_selected, delete_to_trash, permanent_delete, validate_selection, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteProgressCallback, DeleteResult,
};
