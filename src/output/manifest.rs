//! Append-only provenance log with one JSON record per crawl attempt.

use crate::MirrorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Final outcome of one dequeued URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Fetched with status 200 and written to the mirror
    Saved,
    /// Request completed with a non-200 status; nothing saved
    HttpFail,
    /// Transport failure, or the response could not be stored
    Error,
}

impl Outcome {
    /// The string written to the manifest
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::HttpFail => "http_fail",
            Self::Error => "error",
        }
    }
}

/// One line of the manifest
///
/// Every key is always present; values that do not apply to an outcome are
/// `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// When the attempt was resolved
    pub ts: DateTime<Utc>,

    /// Canonical URL that was dequeued
    pub url: String,

    /// Breadth-first depth (seeds are 0)
    pub depth: u32,

    pub outcome: Outcome,

    /// HTTP status, when a response was received
    pub status: Option<u16>,

    /// Path relative to the mirror root, for `saved`
    pub path: Option<String>,

    /// Failure description, for `error`
    pub error: Option<String>,

    /// Response Content-Type, for `saved`
    #[serde(default)]
    pub content_type: Option<String>,

    /// Number of bytes written, for `saved`
    #[serde(default)]
    pub bytes: Option<u64>,
}

impl ManifestRecord {
    fn new(url: &str, depth: u32, outcome: Outcome) -> Self {
        Self {
            ts: Utc::now(),
            url: url.to_string(),
            depth,
            outcome,
            status: None,
            path: None,
            error: None,
            content_type: None,
            bytes: None,
        }
    }

    /// Record for a resource written to the mirror
    pub fn saved(
        url: &str,
        depth: u32,
        status: u16,
        path: String,
        content_type: String,
        bytes: u64,
    ) -> Self {
        Self {
            status: Some(status),
            path: Some(path),
            content_type: Some(content_type),
            bytes: Some(bytes),
            ..Self::new(url, depth, Outcome::Saved)
        }
    }

    /// Record for a completed request with a non-success status
    pub fn http_fail(url: &str, depth: u32, status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::new(url, depth, Outcome::HttpFail)
        }
    }

    /// Record for a transport or storage failure
    ///
    /// `status` is set when a response arrived but could not be stored.
    pub fn error(url: &str, depth: u32, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: Some(message.into()),
            ..Self::new(url, depth, Outcome::Error)
        }
    }

    /// True for saved resources whose Content-Type is HTML
    pub fn is_html(&self) -> bool {
        self.outcome == Outcome::Saved
            && self
                .content_type
                .as_deref()
                .map_or(false, |ct| ct.contains("text/html"))
    }
}

/// Appends manifest records, one durable line per call
///
/// The file is opened in append mode and never truncated. Each record is
/// written with a single `write_all` and synced before `append` returns, so
/// after a crash every complete line is trustworthy.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    file: File,
    written: u64,
}

impl ManifestWriter {
    /// Opens (or creates) the manifest at `path` for appending
    pub fn open(path: &Path) -> Result<Self, MirrorError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file,
            written: 0,
        })
    }

    /// Appends one record as a JSON line
    pub fn append(&mut self, record: &ManifestRecord) -> Result<(), MirrorError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        self.file.write_all(&line)?;
        self.file.flush()?;
        self.file.sync_data()?;

        self.written += 1;
        Ok(())
    }

    /// Records appended through this writer
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Location of the manifest file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Reads every record of a manifest, skipping blank lines
pub fn read_manifest(path: &Path) -> Result<Vec<ManifestRecord>, MirrorError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }

    Ok(records)
}
