//! dupesweep - byte-exact duplicate file finder
//!
//! Scans a directory (optionally recursively), groups files whose contents
//! are byte-for-byte identical, and removes a user-chosen selection of the
//! copies while leaving everything else in place.

pub mod actions;
pub mod app;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

pub use app::run_app;
