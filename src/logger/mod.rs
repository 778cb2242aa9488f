//! Logger module
//!
//! Structured logging on top of `tracing`:
//! - Server lifecycle events
//! - Access log (Combined Log Format line plus structured fields)
//! - Connection and request errors

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::{Config, LogFormat, LoggingConfig};
use crate::error::ServerError;

/// Target used for access log events, filterable with `RUST_LOG`
pub const ACCESS_TARGET: &str = "coi_serve::access";

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once
/// at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ServerError::Config(format!("invalid log level '{}': {e}", config.level)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|e| ServerError::Config(format!("failed to initialize logging: {e}")))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config, root: &std::path::Path) {
    tracing::info!(
        %addr,
        root = %root.display(),
        workers = ?config.server.workers,
        keep_alive = config.performance.keep_alive,
        "Serving {} at http://{addr}",
        root.display()
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(%peer_addr, "Connection accepted");
}

pub fn log_connection_error(err: &ServerError) {
    tracing::error!(error = %err, "Failed to serve connection");
}

pub fn log_connection_timeout(peer_addr: &SocketAddr, secs: u64) {
    tracing::warn!(%peer_addr, "Connection timeout after {secs} seconds");
}

pub fn log_accept_error(err: &std::io::Error) {
    tracing::error!(error = %err, "Failed to accept connection");
}

pub fn log_bind_failed(addr: &SocketAddr, err: &std::io::Error) {
    tracing::error!(%addr, error = %err, "Failed to bind listener");
}

pub fn log_path_traversal(path: &str) {
    tracing::warn!(path, "Path traversal attempt blocked");
}

pub fn log_read_failed(path: &std::path::Path, err: &std::io::Error) {
    tracing::debug!(path = %path.display(), error = %err, "File not readable");
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!(active_connections, "Shutdown requested, no longer accepting connections");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry) {
    tracing::info!(
        target: ACCESS_TARGET,
        remote_addr = %entry.remote_addr,
        method = %entry.method,
        path = %entry.path,
        status = entry.status,
        body_bytes = entry.body_bytes,
        request_time_us = entry.request_time_us,
        "{}",
        entry.format_combined()
    );
}
