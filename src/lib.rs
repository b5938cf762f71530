//! Footbag Mirror: a deterministic, replayable website mirror
//!
//! This crate implements a breadth-first crawler that saves every in-scope
//! resource of a public website under a mirror root and records one
//! provenance line per attempt in an append-only manifest.

pub mod config;
pub mod crawler;
pub mod mirror;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for mirror operations
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest serialization error: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error(
        "Sanity check failed: mirror is empty ({saved_files} files saved, {saved_html} HTML files saved)"
    )]
    SanityViolation { saved_files: u64, saved_html: u64 },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported policy format '{0}' (expected .json or .toml)")]
    UnsupportedFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised while mapping a URL onto the mirror tree
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Path traversal blocked for {url}: {path} escapes the mirror root")]
    Traversal { url: String, path: String },

    #[error("Path collision for {url}: {path} is already claimed by {existing}")]
    Collision {
        url: String,
        path: String,
        existing: String,
    },

    #[error("Cannot map URL onto the mirror: {0}")]
    InvalidUrl(String),
}

/// Result type alias for mirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for path mapping operations
pub type PathResult<T> = std::result::Result<T, PathError>;

// Re-export commonly used types
pub use config::{CrawlSettings, Policy};
pub use output::{ManifestRecord, Outcome, SanityCounters};
pub use url::{in_scope, normalize_url, CanonicalUrl};
