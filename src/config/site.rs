// Static site configuration
// Read-only view of the asset root handed to every request handler

use std::path::{Component, Path, PathBuf};

use super::types::AssetsConfig;
use crate::error::ServerError;

/// Immutable serving configuration shared by all requests.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    root: PathBuf,
    index_file: String,
}

impl SiteConfig {
    /// Create a site rooted at `root`.
    ///
    /// A relative root is made absolute against the current directory, then
    /// normalized lexically so containment checks compare clean paths.
    pub fn new(root: impl AsRef<Path>, index_file: impl Into<String>) -> Result<Self, ServerError> {
        let root = root.as_ref();
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };

        Ok(Self {
            root: normalize_lexically(&absolute),
            index_file: index_file.into(),
        })
    }

    pub fn from_assets(assets: &AssetsConfig) -> Result<Self, ServerError> {
        Self::new(&assets.root, assets.index_file.as_str())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_file(&self) -> &str {
        &self.index_file
    }
}

/// Resolve `.` and `..` components without touching the filesystem
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}
