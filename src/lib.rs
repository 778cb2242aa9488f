//! Static asset server that enables cross-origin isolation.
//!
//! Files under a single root directory are served with
//! `Cross-Origin-Embedder-Policy: credentialless` and
//! `Cross-Origin-Opener-Policy: same-origin`, which browsers require before
//! exposing `SharedArrayBuffer` to a page.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod worker;
