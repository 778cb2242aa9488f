//! Request handler module
//!
//! Resolves request paths under the asset root and serves the files found
//! there.

pub mod resolve;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::{handle_request, serve};
