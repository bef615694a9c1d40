//! Command-line interface definitions for dupesweep.
//!
//! ```bash
//! # Report duplicates in a folder, top level only
//! dupesweep scan ~/Pictures
//!
//! # Include subfolders, JSON for scripting
//! dupesweep scan ~/Pictures -r --output json
//!
//! # Remove one copy of a pair found earlier
//! dupesweep delete ~/Pictures --select ./IMG_0001\ copy.png
//!
//! # Show the effective configuration
//! dupesweep config
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::duplicates::MergePolicy;

/// Find byte-identical files in a folder and remove the copies you pick.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Delete selected files from a scanned directory
    Delete(DeleteArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Include files in subdirectories
    #[arg(short, long)]
    pub recursive: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Number of threads reading file contents
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Fail on the first unreadable directory or file
    #[arg(long)]
    pub strict: bool,

    /// How equal pairs are merged into sets
    #[arg(long, value_enum, value_name = "POLICY")]
    pub merge_policy: Option<MergePolicy>,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Directory the selection is relative to
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Root-relative path to delete, e.g. ./a/b.png (repeatable)
    #[arg(short, long = "select", value_name = "REL")]
    pub select: Vec<String>,

    /// File listing paths to delete, one per line or a JSON array
    #[arg(long, value_name = "FILE")]
    pub select_file: Option<PathBuf>,

    /// Move files to the trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Skip the check that every duplicate set keeps one copy
    #[arg(long)]
    pub force: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Text,
    /// Machine-readable JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
