//! Error types
//!
//! Request outcomes (`ServeError`) are kept separate from process-level
//! failures (`ServerError`): the former become status codes, the latter
//! terminate a connection or the whole process.

use hyper::StatusCode;
use thiserror::Error;

/// Terminal outcome of a single static file request.
///
/// The `Display` text is what the client sees, so it must never carry
/// filesystem details.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServeError {
    /// Resolved path escapes the asset root
    #[error("Forbidden")]
    Forbidden,
    /// File is missing, unreadable, or a directory
    #[error("Not found")]
    NotFound,
}

impl ServeError {
    /// HTTP status code reported to the client
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

/// Process and connection level failures.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// Socket or protocol failure on one connection
    #[error("transport error: {0}")]
    Transport(#[from] hyper::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Failures reported by the resize worker client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The worker could not load its image library
    #[error("worker failed to initialize: {0}")]
    Init(String),
    /// The worker rejected or failed a single request
    #[error("resize failed: {0}")]
    Resize(String),
    #[error("worker disconnected")]
    Disconnected,
    #[error("invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
}

impl From<config::ConfigError> for ServerError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ServeError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ServeError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_client_messages_are_generic() {
        assert_eq!(ServeError::Forbidden.to_string(), "Forbidden");
        assert_eq!(ServeError::NotFound.to_string(), "Not found");
    }
}
