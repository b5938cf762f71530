//! Post-crawl sanity gate
//!
//! Aggregate counters are accumulated while the crawl runs (or recomputed
//! from a manifest). After the frontier empties they are written to a small
//! summary file and evaluated: a run that saved no files, or no HTML files,
//! is a failed run no matter how many individual fetches succeeded.

use crate::output::manifest::{ManifestRecord, Outcome};
use crate::MirrorError;
use std::fs;
use std::path::Path;

/// Aggregate tallies for a crawl
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SanityCounters {
    /// Resources written to the mirror
    pub saved_files: u64,

    /// Saved resources whose Content-Type is HTML
    pub saved_html: u64,

    /// Total bytes written
    pub bytes_saved: u64,
}

impl SanityCounters {
    /// Creates zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one saved resource
    pub fn record_saved(&mut self, bytes: u64, is_html: bool) {
        self.saved_files += 1;
        self.bytes_saved += bytes;
        if is_html {
            self.saved_html += 1;
        }
    }

    /// Recomputes counters from manifest records
    pub fn from_records(records: &[ManifestRecord]) -> Self {
        records
            .iter()
            .filter(|r| r.outcome == Outcome::Saved)
            .fold(Self::new(), |mut counters, record| {
                counters.record_saved(record.bytes.unwrap_or(0), record.is_html());
                counters
            })
    }

    /// Fails when nothing, or no HTML, was saved
    pub fn evaluate(&self) -> Result<(), MirrorError> {
        if self.saved_files == 0 || self.saved_html == 0 {
            return Err(MirrorError::SanityViolation {
                saved_files: self.saved_files,
                saved_html: self.saved_html,
            });
        }
        Ok(())
    }

    /// The `key=value` summary text
    pub fn summary(&self) -> String {
        format!(
            "saved_files={}\nsaved_html={}\nbytes_saved={}\n",
            self.saved_files, self.saved_html, self.bytes_saved
        )
    }

    /// Writes the summary, replacing any previous one
    pub fn write_summary(&self, path: &Path) -> Result<(), MirrorError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.summary())?;
        Ok(())
    }
}

/// Prints counters to stdout
pub fn print_counters(counters: &SanityCounters, records: usize) {
    println!("=== Mirror Statistics ===\n");

    println!("Manifest records: {}", records);
    println!("  Files saved: {}", counters.saved_files);
    println!("  HTML files saved: {}", counters.saved_html);
    println!("  Bytes saved: {}", counters.bytes_saved);
    println!();

    match counters.evaluate() {
        Ok(()) => println!("Sanity: ok"),
        Err(e) => println!("Sanity: FAILED ({})", e),
    }
}
