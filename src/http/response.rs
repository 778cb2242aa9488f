//! HTTP response building module
//!
//! Every response leaving the server goes through these builders, which is
//! what guarantees the cross-origin isolation headers are never missing.

use crate::error::ServeError;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::HeaderValue;
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

pub const COEP_HEADER: &str = "Cross-Origin-Embedder-Policy";
pub const COEP_VALUE: &str = "credentialless";
pub const COOP_HEADER: &str = "Cross-Origin-Opener-Policy";
pub const COOP_VALUE: &str = "same-origin";

/// Attach the two headers that enable cross-origin isolation.
///
/// `credentialless` lets pages embed third-party resources (e.g. a CDN) that
/// do not send `Cross-Origin-Resource-Policy`.
pub fn with_isolation_headers(builder: Builder) -> Builder {
    builder
        .header(COEP_HEADER, COEP_VALUE)
        .header(COOP_HEADER, COOP_VALUE)
}

/// Build 200 response carrying a file
pub fn build_file_response(
    data: Bytes,
    content_type: &str,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let content_length = data.len();
    let body = if is_head { Bytes::new() } else { data };

    with_isolation_headers(Response::builder().status(StatusCode::OK))
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            fallback_response(StatusCode::OK)
        })
}

/// Build 403/404 response for a failed lookup
pub fn build_error_response(err: ServeError, is_head: bool) -> Response<Full<Bytes>> {
    let message = err.to_string();
    let content_length = message.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(message)
    };

    with_isolation_headers(Response::builder().status(err.status()))
        .header("Content-Type", "text/plain")
        .header("Content-Length", content_length)
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error(err.status().as_str(), &e);
            fallback_response(err.status())
        })
}

/// Empty response used when the builder rejects its input; still isolated
fn fallback_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    let headers = resp.headers_mut();
    headers.insert(COEP_HEADER, HeaderValue::from_static(COEP_VALUE));
    headers.insert(COOP_HEADER, HeaderValue::from_static(COOP_VALUE));
    resp
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    fn assert_isolated<B>(resp: &Response<B>) {
        assert_eq!(resp.headers()[COEP_HEADER], COEP_VALUE);
        assert_eq!(resp.headers()[COOP_HEADER], COOP_VALUE);
    }

    #[tokio::test]
    async fn test_file_response() {
        let resp = build_file_response(Bytes::from_static(b"body{}"), "text/css", false);
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "text/css");
        assert_eq!(resp.headers()["Content-Length"], "6");
        assert_isolated(&resp);
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"body{}");
    }

    #[test]
    fn test_fallback_is_isolated() {
        let resp = fallback_response(StatusCode::NOT_FOUND);
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_isolated(&resp);
    }

    #[tokio::test]
    async fn test_head_keeps_length_drops_body() {
        let resp = build_file_response(Bytes::from_static(b"abcd"), "image/png", true);
        assert_eq!(resp.headers()["Content-Length"], "4");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_error_responses_are_isolated() {
        let forbidden = build_error_response(ServeError::Forbidden, false);
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
        assert_isolated(&forbidden);
        let body = forbidden.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Forbidden");

        let missing = build_error_response(ServeError::NotFound, false);
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_isolated(&missing);
        let body = missing.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"Not found");
    }
}
