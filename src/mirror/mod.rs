//! Mirror tree module
//!
//! This module maps canonical URLs onto files under the mirror root and
//! writes fetched bytes there, refusing any write that would escape the root
//! or overwrite a file saved for a different URL.

mod layout;
mod store;

pub use layout::{resource_path, MirrorLayout, MirrorPath, PathClaims, INDEX_FILE};
pub use store::MirrorStore;
