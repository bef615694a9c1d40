//! Human-readable output.
//!
//! Sets are numbered from `#1` in output order, one member path per line.
//! Colors come from `yansi` and are switched off globally by `--no-color`.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::Paint;

use crate::actions::BatchDeleteResult;
use crate::duplicates::{DuplicateSet, ScanSummary};

/// Message printed when a scan finds nothing.
pub const NO_DUPLICATES_MESSAGE: &str = "No duplicates found!";

/// Text rendering of a finished scan.
#[derive(Debug, Clone, Copy)]
pub struct TextOutput<'a> {
    sets: &'a [DuplicateSet],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Wrap scan results for rendering.
    #[must_use]
    pub fn new(sets: &'a [DuplicateSet], summary: &'a ScanSummary) -> Self {
        Self { sets, summary }
    }

    /// Render everything into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();

        if self.sets.is_empty() {
            out.push_str(&format!("{}\n", NO_DUPLICATES_MESSAGE.green()));
        }

        for (index, set) in self.sets.iter().enumerate() {
            out.push_str(&format!(
                "{} {} x {}\n",
                format!("#{}", index + 1).bold(),
                ByteSize(set.size),
                set.len()
            ));
            for member in &set.members {
                out.push_str(&format!("  {}\n", member.path));
            }
            out.push('\n');
        }

        if !self.sets.is_empty() {
            out.push_str(&format!(
                "{} duplicate set(s), {} redundant file(s), {} reclaimable\n",
                self.summary.duplicate_sets.bold(),
                self.summary.duplicate_files,
                self.summary.reclaimable_display().green()
            ));
        }

        let skipped = self.summary.scan_errors.len() + self.summary.load_errors.len();
        if skipped > 0 {
            out.push_str(&format!(
                "{}\n",
                format!("Skipped {skipped} unreadable path(s):").yellow()
            ));
            for error in &self.summary.scan_errors {
                out.push_str(&format!("  {error}\n"));
            }
            for error in &self.summary.load_errors {
                out.push_str(&format!("  {error}\n"));
            }
        }

        out
    }

    /// Write the rendering to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.render().as_bytes())
    }
}

/// Render the outcome of a delete pass.
#[must_use]
pub fn render_delete(result: &BatchDeleteResult) -> String {
    let mut out = String::new();

    for success in &result.successes {
        let verb = if success.trashed { "trashed" } else { "deleted" };
        out.push_str(&format!("{} {}\n", verb.green(), success.path));
    }
    for (path, error) in &result.failures {
        out.push_str(&format!("{} {}: {}\n", "failed".red(), path, error));
    }
    for path in &result.missing {
        out.push_str(&format!("{} {}\n", "missing".dim(), path));
    }

    out.push_str(&format!("{}\n", result.summary().bold()));
    out
}
