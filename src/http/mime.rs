//! MIME type detection module
//!
//! Maps a file extension to the Content-Type sent to the browser. The table is
//! fixed at compile time and matched case-insensitively.

use std::path::Path;

/// Fallback for any extension not in the table
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type based on file extension (without the leading dot)
///
/// # Examples
/// ```
/// use coi_serve::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("HTML")), "text/html");
/// assert_eq!(get_content_type(Some("wasm")), "application/wasm");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let Some(ext) = extension else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        // Documents and scripts
        "html" => "text/html",
        "js" => "application/javascript",
        "css" => "text/css",
        "json" => "application/json",
        "wasm" => "application/wasm",

        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",

        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Content-Type for a resolved file path
pub fn content_type_for(path: &Path) -> &'static str {
    get_content_type(path.extension().and_then(|e| e.to_str()))
}
