//! Request path resolution
//!
//! Maps a request path onto the asset root with a purely lexical join and
//! rejects anything that ends up outside the root before the filesystem is
//! touched.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use crate::config::SiteConfig;
use crate::error::ServeError;

/// Strip the query component and substitute the index document for `/`.
pub fn normalize_request_path<'a>(raw: &'a str, index_file: &str) -> Cow<'a, str> {
    let path = raw.split_once('?').map_or(raw, |(path, _)| path);
    if path == "/" {
        Cow::Owned(format!("/{index_file}"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Join `request` onto `root` lexically.
///
/// `..` removes the previous component and may climb above `root`; leading
/// separators and `.` segments are ignored. A trailing separator is kept so a
/// file requested as a directory fails to read.
pub fn lexical_join(root: &Path, request: &str) -> PathBuf {
    let mut resolved = root.to_path_buf();
    for component in Path::new(request).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::ParentDir => {
                resolved.pop();
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    if request.ends_with('/') {
        resolved.push("");
    }
    resolved
}

/// True when `path` is `root` or lies beneath it.
///
/// Comparison is per path component, so `/public2` is not inside `/public`.
pub fn is_within(root: &Path, path: &Path) -> bool {
    path.starts_with(root)
}

/// Resolve a raw request path to a file path under the site root
pub fn resolve(site: &SiteConfig, raw_path: &str) -> Result<PathBuf, ServeError> {
    let normalized = normalize_request_path(raw_path, site.index_file());
    let resolved = lexical_join(site.root(), &normalized);

    if is_within(site.root(), &resolved) {
        Ok(resolved)
    } else {
        Err(ServeError::Forbidden)
    }
}
