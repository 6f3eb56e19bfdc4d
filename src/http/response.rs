//! HTTP response building module
//!
//! Every response carries an exact `Content-Length`. Builders never panic: a
//! failed build is logged and replaced by a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use super::cache::CachePolicy;
use super::mime;

/// Build 200 OK response with `no-cache`
pub fn build_ok_response(body: impl Into<Bytes>, content_type: &str) -> Response<Full<Bytes>> {
    let body = body.into();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", content_type)
        .header("Content-Length", body.len())
        .header("Cache-Control", CachePolicy::NoCache.to_header_value())
        .body(Full::new(body))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build 404 Not Found response with a short plain-text message
pub fn build_404_response(message: &str) -> Response<Full<Bytes>> {
    build_error_response(StatusCode::NOT_FOUND, format!("404 Not Found: {message}"))
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<Full<Bytes>> {
    let mut response = build_error_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "405 Method Not Allowed".to_string(),
    );
    response
        .headers_mut()
        .insert("Allow", hyper::header::HeaderValue::from_static("GET"));
    response
}

/// Build 500 Internal Server Error response; never carries internal detail
pub fn build_500_response() -> Response<Full<Bytes>> {
    build_error_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        "500 Internal Server Error".to_string(),
    )
}

fn build_error_response(status: StatusCode, text: String) -> Response<Full<Bytes>> {
    let body = Bytes::from(text);
    Response::builder()
        .status(status)
        .header("Content-Type", mime::TEXT_PLAIN)
        .header("Content-Length", body.len())
        .header("Cache-Control", CachePolicy::NoStore.to_header_value())
        .body(Full::new(body.clone()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut fallback = Response::new(Full::new(body));
            *fallback.status_mut() = status;
            fallback
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
