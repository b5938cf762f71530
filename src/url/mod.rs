//! URL handling module for the mirror crawler
//!
//! This module provides URL normalization into a canonical identity, host
//! extraction, and the policy scope filter.

mod domain;
mod normalize;
mod scope;

use std::fmt;
use url::Url;

// Re-export main functions
pub use domain::extract_authority;
pub use normalize::{normalize_url, UI_NOISE_PARAMS};
pub use scope::in_scope;

/// A URL after normalization; the unit of identity for deduplication,
/// scope decisions and storage mapping.
///
/// Input that could not be interpreted as an absolute http(s) URL is carried
/// through verbatim with no host, which keeps it out of every scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl {
    serialized: String,
    host: Option<String>,
    path: String,
    query: Option<String>,
}

impl CanonicalUrl {
    pub(crate) fn from_parts(host: String, path: String, query: Option<String>) -> Self {
        let serialized = match &query {
            Some(q) => format!("http://{}{}?{}", host, path, q),
            None => format!("http://{}{}", host, path),
        };

        Self {
            serialized,
            host: Some(host),
            path,
            query,
        }
    }

    pub(crate) fn passthrough(raw: &str) -> Self {
        Self {
            serialized: raw.to_string(),
            host: None,
            path: String::new(),
            query: None,
        }
    }

    /// The canonical string form
    pub fn as_str(&self) -> &str {
        &self.serialized
    }

    /// Host with an explicit non-default port, if any
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Path component; always starts with `/` for canonical URLs
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Serialized, filtered and sorted query string
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns false for input that was passed through unnormalized
    pub fn is_canonical(&self) -> bool {
        self.host.is_some()
    }

    /// Parses the canonical form back into a `Url`
    pub fn to_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.serialized)
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialized)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.serialized
    }
}
