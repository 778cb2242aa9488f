//! Resize worker message contract
//!
//! JSON shapes exchanged with the external image worker. Field names are
//! camelCase and responses are tagged by `type`.

use serde::{Deserialize, Serialize};

/// Output encodings the worker accepts, carried on the wire as a MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl From<String> for ImageFormat {
    fn from(mime: String) -> Self {
        Self::from_mime(&mime)
    }
}

impl From<ImageFormat> for &'static str {
    fn from(format: ImageFormat) -> Self {
        format.mime()
    }
}

impl ImageFormat {
    pub const fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Extension the worker's encoder is selected by
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Webp => ".webp",
        }
    }

    /// Parse a MIME type; anything unrecognized encodes as JPEG
    pub fn from_mime(mime: &str) -> Self {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/webp" => Self::Webp,
            _ => Self::Jpeg,
        }
    }
}

/// Request sent to the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeRequest {
    pub id: u64,
    pub input_buffer: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    /// Encoder quality, 1..=100 (ignored for PNG)
    pub quality: u8,
}

/// Message received from the worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkerMessage {
    /// Image library loaded, requests can be processed
    Ready,
    Result {
        id: u64,
        buffer: Vec<u8>,
        format: ImageFormat,
    },
    Error {
        id: u64,
        error: String,
    },
    /// Image library failed to load; no request will ever succeed
    ErrorInit {
        error: String,
    },
}
