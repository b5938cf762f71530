use crate::mirror::layout::{MirrorLayout, MirrorPath, PathClaims};
use crate::url::CanonicalUrl;
use crate::{MirrorError, PathError};
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Writes fetched resources into the mirror tree
///
/// Combines the lexical [`MirrorLayout`] mapping with filesystem checks. The
/// created parent directory is canonicalized and must still sit under the
/// canonical mirror root, and each file may be claimed by only one URL per
/// crawl. Bodies are written to a temporary file in that parent and renamed
/// into place, so a symlink at the target path is replaced rather than
/// written through, and a failed write leaves no partial file behind.
#[derive(Debug)]
pub struct MirrorStore {
    layout: MirrorLayout,
    canonical_root: PathBuf,
    claims: PathClaims,
}

impl MirrorStore {
    /// Creates the mirror root if needed and opens a store over it
    pub fn open(root: &Path) -> Result<Self, MirrorError> {
        fs::create_dir_all(root)?;
        let canonical_root = fs::canonicalize(root)?;

        Ok(Self {
            layout: MirrorLayout::new(root),
            canonical_root,
            claims: PathClaims::new(),
        })
    }

    /// Saves `body` for `url`, returning where it was written
    ///
    /// Nothing is written when the mapping escapes the root or collides with
    /// a file already saved for a different URL.
    pub fn save(&mut self, url: &CanonicalUrl, body: &[u8]) -> Result<MirrorPath, MirrorError> {
        let path = self.layout.map(url)?;
        self.claims.check(&path, url)?;

        let parent = path.absolute.parent().ok_or_else(|| PathError::Traversal {
            url: url.as_str().to_string(),
            path: path.relative.clone(),
        })?;
        fs::create_dir_all(parent)?;

        let resolved_parent = fs::canonicalize(parent)?;
        if !resolved_parent.starts_with(&self.canonical_root) {
            return Err(PathError::Traversal {
                url: url.as_str().to_string(),
                path: resolved_parent.display().to_string(),
            }
            .into());
        }

        let mut staged = NamedTempFile::new_in(&resolved_parent)?;
        staged.write_all(body)?;
        staged.as_file().sync_data()?;
        staged
            .persist(resolved_parent.join(file_name(&path, url)?))
            .map_err(|e| e.error)?;
        self.claims.claim(&path, url)?;

        tracing::trace!("Wrote {} bytes to {}", body.len(), path.relative);

        Ok(path)
    }

    /// Number of files written by this store
    pub fn saved_count(&self) -> usize {
        self.claims.len()
    }
}

fn file_name<'a>(path: &'a MirrorPath, url: &CanonicalUrl) -> Result<&'a OsStr, PathError> {
    path.absolute.file_name().ok_or_else(|| PathError::Traversal {
        url: url.as_str().to_string(),
        path: path.relative.clone(),
    })
}
