//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the dupesweep binary.
///
/// - 0: Success (completed normally, duplicates found or files deleted)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates found (completed normally, nothing to report)
/// - 3: Partial success (completed with some unreadable paths)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed and produced results.
    Success = 0,
    /// General error: an unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: the scan completed but found no duplicate sets.
    NoDuplicates = 2,
    /// Partial success: completed, but some paths could not be processed.
    PartialSuccess = 3,
    /// Interrupted: stopped by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "DS000",
            Self::GeneralError => "DS001",
            Self::NoDuplicates => "DS002",
            Self::PartialSuccess => "DS003",
            Self::Interrupted => "DS130",
        }
    }

    /// Pick the code for a finished scan.
    #[must_use]
    pub fn for_scan(duplicate_sets: usize, had_errors: bool) -> Self {
        if had_errors {
            Self::PartialSuccess
        } else if duplicate_sets == 0 {
            Self::NoDuplicates
        } else {
            Self::Success
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "DS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::NoDuplicates.as_i32(), 2);
        assert_eq!(ExitCode::PartialSuccess.as_i32(), 3);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_code_prefix() {
        assert_eq!(ExitCode::GeneralError.code_prefix(), "DS001");
        assert_eq!(ExitCode::Interrupted.code_prefix(), "DS130");
    }

    #[test]
    fn test_for_scan() {
        assert_eq!(ExitCode::for_scan(0, false), ExitCode::NoDuplicates);
        assert_eq!(ExitCode::for_scan(2, false), ExitCode::Success);
        assert_eq!(ExitCode::for_scan(2, true), ExitCode::PartialSuccess);
        assert_eq!(ExitCode::for_scan(0, true), ExitCode::PartialSuccess);
    }

    #[test]
    fn test_structured_error() {
        let err = anyhow::anyhow!("inner").context("outer");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);
        assert_eq!(structured.code, "DS001");
        assert_eq!(structured.message, "outer: inner");
        assert!(!structured.interrupted);

        let json = serde_json::to_string(&structured).unwrap();
        assert!(json.contains("\"exit_code\":1"));
    }
}
