//! Mapping from canonical URLs to files under the mirror root
//!
//! Every saved resource lives at `<root>/<host>/<resource path>`. The
//! resource path is derived from the URL alone:
//!
//! - the leading `/` is stripped
//! - an empty path, a path ending in `/`, or a last segment without a `.`
//!   is a directory resource and gets `index.html` appended
//! - a query string is appended to the file name as `?<query>`
//!
//! The composed path is resolved lexically and rejected if it would leave
//! the host directory.

use crate::url::CanonicalUrl;
use crate::{PathError, PathResult};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// File name used for directory resources
pub const INDEX_FILE: &str = "index.html";

/// Location of one resource in the mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorPath {
    /// Path relative to the mirror root, `/`-separated, starting with the host
    pub relative: String,

    /// Lexically resolved absolute (root-joined) path
    pub absolute: PathBuf,
}

/// Computes storage locations under a fixed mirror root
#[derive(Debug, Clone)]
pub struct MirrorLayout {
    root: PathBuf,
}

impl MirrorLayout {
    /// Creates a layout rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The mirror root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a canonical URL to its storage location
    ///
    /// # Returns
    ///
    /// * `Ok(MirrorPath)` - A location inside `<root>/<host>/`
    /// * `Err(PathError::InvalidUrl)` - The URL has no host
    /// * `Err(PathError::Traversal)` - The path would escape the mirror root
    ///
    /// # Example
    ///
    /// ```
    /// use footbag_mirror::config::Policy;
    /// use footbag_mirror::mirror::MirrorLayout;
    /// use footbag_mirror::url::normalize_url;
    ///
    /// let policy = Policy::new(["www.footbag.org"], ["/events"]);
    /// let layout = MirrorLayout::new("/srv/mirror");
    /// let url = normalize_url("http://footbag.org/events/show/12", &policy);
    ///
    /// let mapped = layout.map(&url).unwrap();
    /// assert_eq!(mapped.relative, "www.footbag.org/events/show/12/index.html");
    /// ```
    pub fn map(&self, url: &CanonicalUrl) -> PathResult<MirrorPath> {
        let host = url
            .host()
            .ok_or_else(|| PathError::InvalidUrl(url.as_str().to_string()))?;

        let resource = resource_path(url.path(), url.query());
        let traversal = || PathError::Traversal {
            url: url.as_str().to_string(),
            path: format!("{}/{}", host, resource),
        };

        let host_component = single_component(host).ok_or_else(traversal)?;
        let segments = resolve_segments(&resource).ok_or_else(traversal)?;

        let mut absolute = self.root.join(host_component);
        let mut relative = vec![host.to_string()];
        for segment in segments {
            absolute.push(segment);
            relative.push(segment.to_string_lossy().into_owned());
        }

        if !absolute.starts_with(&self.root) {
            return Err(traversal());
        }

        Ok(MirrorPath {
            relative: relative.join("/"),
            absolute,
        })
    }
}

/// Derives the host-relative resource path from a URL path and query
pub fn resource_path(path: &str, query: Option<&str>) -> String {
    let trimmed = path.trim_start_matches('/');

    let mut resource = if is_directory_resource(trimmed) {
        let dir = trimmed.trim_end_matches('/');
        if dir.is_empty() {
            INDEX_FILE.to_string()
        } else {
            format!("{}/{}", dir, INDEX_FILE)
        }
    } else {
        trimmed.to_string()
    };

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        resource.push('?');
        resource.push_str(query);
    }

    resource
}

/// A resource is a directory when it is empty, ends with `/`, or its last
/// segment has no extension
fn is_directory_resource(trimmed: &str) -> bool {
    if trimmed.is_empty() || trimmed.ends_with('/') {
        return true;
    }

    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    !last.contains('.')
}

/// Returns the host as exactly one normal path component
fn single_component(host: &str) -> Option<&OsStr> {
    let mut components = Path::new(host).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(name)), None) => Some(name),
        _ => None,
    }
}

/// Folds `.` and `..` segments; `None` if a `..` climbs above the start or
/// the path is absolute
fn resolve_segments(resource: &str) -> Option<Vec<&OsStr>> {
    let mut segments = Vec::new();

    for component in Path::new(resource).components() {
        match component {
            Component::Normal(name) => segments.push(name),
            Component::CurDir => {}
            Component::ParentDir => {
                segments.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if segments.is_empty() {
        return None;
    }

    Some(segments)
}

/// Per-crawl record of which URL owns which file
///
/// Keeps the URL-to-file mapping injective: a second, distinct URL that maps
/// onto an already claimed file is refused instead of overwriting it.
#[derive(Debug, Default)]
pub struct PathClaims {
    claimed: HashMap<PathBuf, String>,
}

impl PathClaims {
    /// Creates an empty claim table
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that `path` is free or already owned by `url`
    pub fn check(&self, path: &MirrorPath, url: &CanonicalUrl) -> PathResult<()> {
        match self.claimed.get(&path.absolute) {
            Some(existing) if existing != url.as_str() => Err(PathError::Collision {
                url: url.as_str().to_string(),
                path: path.relative.clone(),
                existing: existing.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Records `url` as the owner of `path`
    pub fn claim(&mut self, path: &MirrorPath, url: &CanonicalUrl) -> PathResult<()> {
        self.check(path, url)?;
        self.claimed
            .insert(path.absolute.clone(), url.as_str().to_string());
        Ok(())
    }

    /// Number of claimed files
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Returns true when nothing has been claimed yet
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}
