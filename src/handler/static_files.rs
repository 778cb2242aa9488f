//! Static file serving module
//!
//! Loads a resolved file and classifies it by extension.

use std::path::PathBuf;

use hyper::body::Bytes;
use tokio::fs;

use crate::config::SiteConfig;
use crate::error::ServeError;
use crate::handler::resolve;
use crate::http::mime;
use crate::logger;

/// A file read from the asset root
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub path: PathBuf,
    pub content: Bytes,
    pub content_type: &'static str,
}

/// Load the file a request path refers to.
///
/// Returns `Forbidden` for paths escaping the root, without any filesystem
/// access, and `NotFound` for anything that cannot be read as a file.
pub async fn load_file(site: &SiteConfig, raw_path: &str) -> Result<StaticFile, ServeError> {
    let path = resolve::resolve(site, raw_path).inspect_err(|_| {
        logger::log_path_traversal(raw_path);
    })?;

    // Reading a directory fails, which keeps directories in the NotFound bucket
    let content = match fs::read(&path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_read_failed(&path, &e);
            return Err(ServeError::NotFound);
        }
    };

    let content_type = mime::content_type_for(&path);
    Ok(StaticFile {
        path,
        content: Bytes::from(content),
        content_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, SiteConfig) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>hi</h1>").unwrap();
        std::fs::write(dir.path().join("photo.webp"), b"RIFF").unwrap();
        std::fs::write(dir.path().join("Vips.WASM"), b"\0asm").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "plain").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        let site = SiteConfig::new(dir.path(), "index.html").unwrap();
        (dir, site)
    }

    #[tokio::test]
    async fn test_index_document() {
        let (_dir, site) = fixture();
        let file = load_file(&site, "/").await.unwrap();
        assert_eq!(&file.content[..], b"<h1>hi</h1>");
        assert_eq!(file.content_type, "text/html");
        assert!(file.path.ends_with("index.html"));
    }

    #[tokio::test]
    async fn test_content_types() {
        let (_dir, site) = fixture();
        assert_eq!(load_file(&site, "/photo.webp").await.unwrap().content_type, "image/webp");
        assert_eq!(
            load_file(&site, "/Vips.WASM").await.unwrap().content_type,
            "application/wasm"
        );
        assert_eq!(
            load_file(&site, "/notes.txt").await.unwrap().content_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (_dir, site) = fixture();
        assert_eq!(
            load_file(&site, "/missing.png").await.unwrap_err(),
            ServeError::NotFound
        );
    }

    #[tokio::test]
    async fn test_directory_is_not_found() {
        let (_dir, site) = fixture();
        assert_eq!(load_file(&site, "/assets").await.unwrap_err(), ServeError::NotFound);
        assert_eq!(load_file(&site, "/assets/").await.unwrap_err(), ServeError::NotFound);
    }

    #[tokio::test]
    async fn test_file_with_trailing_slash_is_not_found() {
        let (_dir, site) = fixture();
        assert_eq!(
            load_file(&site, "/index.html/").await.unwrap_err(),
            ServeError::NotFound
        );
        assert_eq!(
            load_file(&site, "/photo.webp/?w=10").await.unwrap_err(),
            ServeError::NotFound
        );
    }

    #[tokio::test]
    async fn test_traversal_never_reads_sibling() {
        let parent = tempfile::tempdir().unwrap();
        let root = parent.path().join("public");
        let sibling = parent.path().join("public2");
        std::fs::create_dir(&root).unwrap();
        std::fs::create_dir(&sibling).unwrap();
        std::fs::write(sibling.join("secret.txt"), "nope").unwrap();

        let site = SiteConfig::new(&root, "index.html").unwrap();
        assert_eq!(
            load_file(&site, "/../public2/secret.txt").await.unwrap_err(),
            ServeError::Forbidden
        );
        assert_eq!(
            load_file(&site, "/../../etc/passwd").await.unwrap_err(),
            ServeError::Forbidden
        );
    }
}
