//! Request entry point
//!
//! Rejects non-GET methods, runs the synchronous router on the blocking pool and
//! writes the access log line.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::config::AppState;
use crate::http;
use crate::logger::{self, AccessLogEntry};

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.uri().path().to_string(), |pq| pq.as_str().to_string());

    let response = if req.method() == Method::GET {
        dispatch(&state, target.clone()).await
    } else {
        http::build_405_response()
    };

    let status = response.status().as_u16();
    if should_log(status, state.config.logging.access_log) {
        let mut entry = AccessLogEntry::new(peer_addr.to_string(), req.method().to_string(), target);
        entry.http_version = version_label(req.version());
        entry.status = status;
        entry.body_bytes = response_length(&response);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Error-class responses are always logged; the rest only with `logging.access_log`
const fn should_log(status: u16, access_log: bool) -> bool {
    status >= 400 || access_log
}

/// File reads block, so the router runs on the blocking pool. A panic there is
/// contained to this request and reported as 500.
async fn dispatch(state: &Arc<AppState>, target: String) -> Response<Full<Bytes>> {
    let router = Arc::clone(&state.router);
    let path = target.clone();
    match tokio::task::spawn_blocking(move || router.respond(&target)).await {
        Ok(response) => response,
        Err(e) => {
            logger::log_error(&format!("Request handler for {path} did not complete: {e}"));
            http::build_500_response()
        }
    }
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn response_length(response: &Response<Full<Bytes>>) -> u64 {
    response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use tempfile::{tempdir, TempDir};

    fn test_state() -> (TempDir, Arc<AppState>) {
        let dir = tempdir().unwrap();
        let site = dir.path().join("site");
        let data = dir.path().join("data");
        std::fs::create_dir(&site).unwrap();
        std::fs::create_dir(&data).unwrap();
        std::fs::write(site.join("index.html"), "<h1>mpr</h1>").unwrap();
        std::fs::write(data.join("mpr3_stats.csv"), "ts,rx\n").unwrap();

        let mut cfg = Config::load_from(dir.path().join("absent").to_str().unwrap()).unwrap();
        cfg.paths.html_dir = site.to_string_lossy().into_owned();
        cfg.paths.data_dir = data.to_string_lossy().into_owned();
        let state = Arc::new(AppState::new(&cfg).unwrap());
        (dir, state)
    }

    fn request(method: Method, uri: &str) -> Request<()> {
        Request::builder().method(method).uri(uri).body(()).unwrap()
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_get_is_routed() {
        let (_dir, state) = test_state();
        let response = handle_request(request(Method::GET, "/api/controllers?x=1"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body, r#"[{"id":3,"name":"mpr3","csv":"/data/mpr3_stats.csv"}]"#);
    }

    #[tokio::test]
    async fn test_non_get_methods_are_rejected() {
        let (_dir, state) = test_state();
        for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
            let response = handle_request(request(method.clone(), "/"), Arc::clone(&state), peer())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_eq!(response.headers()["allow"], "GET");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_404() {
        let (_dir, state) = test_state();
        let response = handle_request(request(Method::GET, "/foo/bar"), state, peer())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_should_log() {
        for status in [404, 405, 500] {
            assert!(should_log(status, false), "{status}");
            assert!(should_log(status, true), "{status}");
        }
        assert!(!should_log(200, false));
        assert!(should_log(200, true));
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
