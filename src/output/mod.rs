//! Output formatters for scan and delete results.
//!
//! - Text for people, with optional colors
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::DuplicateFinder;
//! use dupesweep::error::ExitCode;
//! use dupesweep::output::{JsonOutput, TextOutput};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, summary) = finder.find_duplicates(Path::new(".")).unwrap();
//!
//! print!("{}", TextOutput::new(&sets, &summary).render());
//!
//! let json = JsonOutput::new(&sets, &summary, ExitCode::Success);
//! println!("{}", json.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonDeleteOutput, JsonOutput, JsonOutputError};
pub use text::{render_delete, TextOutput, NO_DUPLICATES_MESSAGE};
