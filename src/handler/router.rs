//! Request dispatch module
//!
//! Entry point for HTTP request processing. Every method is served the same
//! way; `HEAD` only differs in that the body is dropped.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};

use crate::config::{AppState, SiteConfig};
use crate::handler::static_files;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    // The body is never read
    let (parts, _) = req.into_parts();
    let is_head = parts.method == Method::HEAD;

    let response = serve(&state.site, parts.uri.path(), is_head).await;

    if state.config.logging.access_log {
        log_access(&parts, &response, peer_addr, started);
    }
    Ok(response)
}

/// Serve a request path from `site`
pub async fn serve(site: &SiteConfig, path: &str, is_head: bool) -> Response<Full<Bytes>> {
    match static_files::load_file(site, path).await {
        Ok(file) => http::build_file_response(file.content, file.content_type, is_head),
        Err(err) => http::build_error_response(err, is_head),
    }
}

fn log_access(
    req: &Parts,
    response: &Response<Full<Bytes>>,
    peer_addr: SocketAddr,
    started: Instant,
) {
    let header = |name: &str| {
        req.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.to_string(),
        req.method.to_string(),
        req.uri.path().to_string(),
    );
    entry.query = req.uri.query().map(ToString::to_string);
    entry.http_version = version_label(req.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry);
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
