//! JSON output for scan and delete results.
//!
//! # Scan schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     { "size": 3, "files": ["./x.png", "./y.png"] }
//!   ],
//!   "summary": {
//!     "total_files": 3,
//!     "duplicate_sets": 1,
//!     "reclaimable_space": 3,
//!     "scan_errors": [],
//!     "exit_code": 0,
//!     "exit_code_name": "DS000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::actions::{BatchDeleteResult, DeleteResult};
use crate::duplicates::{DuplicateSet, ScanSummary};
use crate::error::ExitCode;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// File size in bytes
    pub size: u64,
    /// Root-relative paths in discovery order
    pub files: Vec<String>,
}

impl From<&DuplicateSet> for JsonDuplicateSet {
    fn from(set: &DuplicateSet) -> Self {
        Self {
            size: set.size,
            files: set.members.iter().map(|m| m.path.clone()).collect(),
        }
    }
}

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Files discovered by the scanner
    pub total_files: usize,
    /// Files whose content was read
    pub loaded_files: usize,
    /// Combined size of every scanned file
    pub total_size: u64,
    /// Files that shared their size with another file
    pub candidate_files: usize,
    /// Byte comparisons performed
    pub comparisons: usize,
    /// Duplicate sets found
    pub duplicate_sets: usize,
    /// Redundant copies
    pub duplicate_files: usize,
    /// Bytes freed by keeping one copy per set
    pub reclaimable_space: u64,
    /// Duration of the run in milliseconds
    pub scan_duration_ms: u64,
    /// Directories or entries that could not be scanned
    pub scan_errors: Vec<String>,
    /// Files that could not be read
    pub load_errors: Vec<String>,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "DS000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Create a JSON summary from a ScanSummary and an exit code.
    #[must_use]
    pub fn from_scan_summary(summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            total_files: summary.total_files,
            loaded_files: summary.loaded_files,
            total_size: summary.total_size,
            candidate_files: summary.candidate_files,
            comparisons: summary.comparisons,
            duplicate_sets: summary.duplicate_sets,
            duplicate_files: summary.duplicate_files,
            reclaimable_space: summary.reclaimable_space,
            scan_duration_ms: u64::try_from(summary.scan_duration.as_millis()).unwrap_or(u64::MAX),
            scan_errors: summary.scan_errors.iter().map(ToString::to_string).collect(),
            load_errors: summary.load_errors.iter().map(ToString::to_string).collect(),
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output of a scan.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets in output order
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Scan summary statistics
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON view of a scan.
    ///
    /// ```
    /// use dupesweep::duplicates::ScanSummary;
    /// use dupesweep::error::ExitCode;
    /// use dupesweep::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &ScanSummary::default(), ExitCode::NoDuplicates);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(sets: &[DuplicateSet], summary: &ScanSummary, exit_code: ExitCode) -> Self {
        Self {
            duplicates: sets.iter().map(JsonDuplicateSet::from).collect(),
            summary: JsonSummary::from_scan_summary(summary, exit_code),
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        write_json(self, writer, pretty)
    }
}

/// A failed deletion in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeleteFailure {
    /// Root-relative path
    pub path: String,
    /// Error message
    pub error: String,
}

/// Complete JSON output of a delete pass.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDeleteOutput {
    /// Files that were removed
    pub deleted: Vec<DeleteResult>,
    /// Paths that could not be removed
    pub failures: Vec<JsonDeleteFailure>,
    /// Selected paths that were not found
    pub missing: Vec<String>,
    /// Total bytes freed
    pub bytes_freed: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name
    pub exit_code_name: String,
}

impl JsonDeleteOutput {
    /// Build the JSON view of a delete pass.
    #[must_use]
    pub fn new(result: &BatchDeleteResult, exit_code: ExitCode) -> Self {
        Self {
            deleted: result.successes.clone(),
            failures: result
                .failures
                .iter()
                .map(|(path, error)| JsonDeleteFailure {
                    path: path.clone(),
                    error: error.clone(),
                })
                .collect(),
            missing: result.missing.clone(),
            bytes_freed: result.bytes_freed,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }

    /// Write JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        write_json(self, writer, pretty)
    }
}

fn write_json<T: Serialize, W: Write>(
    value: &T,
    writer: &mut W,
    pretty: bool,
) -> Result<(), JsonOutputError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
