//! HTTP protocol layer module
//!
//! Content-Type detection and response builders, independent of how a
//! request is mapped to a file.

pub mod mime;
pub mod response;

pub use response::{build_error_response, build_file_response, with_isolation_headers};
