//! Resize worker integration
//!
//! Image resizing runs in an external worker backed by a native image
//! library. This module only speaks its message protocol.

pub mod client;
pub mod messages;

pub use client::{ResizeClient, ResizedImage, WorkerStatus};
pub use messages::{ImageFormat, ResizeRequest, WorkerMessage};
