//! Output module for crawl provenance and run summaries
//!
//! This module handles:
//! - The append-only JSON-lines manifest (one record per attempt)
//! - Aggregate sanity counters, the summary file, and the sanity gate

pub mod manifest;
pub mod sanity;

pub use manifest::{read_manifest, ManifestRecord, ManifestWriter, Outcome};
pub use sanity::{print_counters, SanityCounters};

use crate::MirrorError;
use std::path::Path;

/// Recomputes sanity counters from a manifest on disk
///
/// Returns the counters together with the number of records read.
pub fn load_counters(manifest_path: &Path) -> Result<(SanityCounters, usize), MirrorError> {
    let records = read_manifest(manifest_path)?;
    Ok((SanityCounters::from_records(&records), records.len()))
}
