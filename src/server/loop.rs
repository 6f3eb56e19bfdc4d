// Server loop module
// Accepts connections until shutdown, then drains the ones still open

use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::watch;

use super::connection::{spawn_connection, ConnectionTracker};
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until `shutdown` flips to `true`.
///
/// The listener is closed as soon as shutdown starts; connections already
/// accepted get up to `performance.shutdown_timeout` to finish. Returns the
/// number of connections still open when the wait ended.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    let tracker = Arc::new(ConnectionTracker::new());

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        spawn_connection(
                            stream,
                            peer_addr,
                            Arc::clone(&state),
                            &tracker,
                            shutdown.clone(),
                        );
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    // Stop accepting new connections
    drop(listener);

    let started = Instant::now();
    let drained = tokio::time::timeout(state.config.shutdown_timeout(), tracker.wait_idle()).await;
    let remaining = if drained.is_ok() { 0 } else { tracker.active() };
    logger::log_shutdown_complete(remaining, started.elapsed());
    remaining
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use http_body_util::{BodyExt, Empty};
    use hyper::body::Bytes;
    use hyper::client::conn::http1;
    use hyper::{Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tempfile::{tempdir, TempDir};
    use tokio::net::TcpStream;

    struct TestServer {
        _dir: TempDir,
        addr: SocketAddr,
        shutdown: watch::Sender<bool>,
        handle: tokio::task::JoinHandle<usize>,
    }

    async fn start_server() -> TestServer {
        start_server_with(|_| {}).await
    }

    async fn start_server_with(configure: impl FnOnce(&mut Config)) -> TestServer {
        let dir = tempdir().unwrap();
        let site = dir.path().join("site");
        let data = dir.path().join("data");
        std::fs::create_dir(&site).unwrap();
        std::fs::create_dir(&data).unwrap();
        std::fs::write(site.join("index.html"), "<h1>dashboard</h1>").unwrap();
        std::fs::write(data.join("mpr0_stats.csv"), "ts,rx\n1,2\n").unwrap();

        let mut cfg = Config::load_from(dir.path().join("absent").to_str().unwrap()).unwrap();
        cfg.server.host = "127.0.0.1".to_string();
        cfg.server.port = 0;
        cfg.paths.html_dir = site.to_string_lossy().into_owned();
        cfg.paths.data_dir = data.to_string_lossy().into_owned();
        cfg.performance.shutdown_timeout = 2;
        configure(&mut cfg);

        let listener = create_listener(cfg.socket_addr().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(&cfg).unwrap());
        let (shutdown, rx) = watch::channel(false);
        let handle = tokio::spawn(run(listener, state, rx));

        TestServer {
            _dir: dir,
            addr,
            shutdown,
            handle,
        }
    }

    async fn get(addr: SocketAddr, path: &str) -> (StatusCode, String) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(conn);

        let req = Request::builder()
            .uri(path)
            .header("host", addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = sender.send_request(req).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_serves_routes_over_tcp() {
        let server = start_server().await;

        assert_eq!(
            get(server.addr, "/").await,
            (StatusCode::OK, "<h1>dashboard</h1>".to_string())
        );
        assert_eq!(
            get(server.addr, "/api/controllers").await,
            (
                StatusCode::OK,
                r#"[{"id":0,"name":"mpr0","csv":"/data/mpr0_stats.csv"}]"#.to_string()
            )
        );
        assert_eq!(
            get(server.addr, "/data/mpr0_stats.csv").await,
            (StatusCode::OK, "ts,rx\n1,2\n".to_string())
        );
        assert_eq!(get(server.addr, "/data/../x.csv").await.0, StatusCode::NOT_FOUND);

        server.shutdown.send(true).unwrap();
        let remaining = tokio::time::timeout(Duration::from_secs(5), server.handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_listener() {
        let server = start_server().await;
        let addr = server.addr;

        server.shutdown.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), server.handle)
            .await
            .unwrap()
            .unwrap();

        assert!(TcpStream::connect(addr).await.is_err());
    }

    #[tokio::test]
    async fn test_shutdown_lets_open_keep_alive_connection_finish() {
        let server = start_server().await;

        // Keep one connection open across the shutdown signal
        let stream = TcpStream::connect(server.addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        let conn_task = tokio::spawn(conn);

        let req = Request::builder()
            .uri("/api/controllers")
            .header("host", server.addr.to_string())
            .body(Empty::<Bytes>::new())
            .unwrap();
        let response = sender.send_request(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response.into_body().collect().await.unwrap();

        server.shutdown.send(true).unwrap();
        let remaining = tokio::time::timeout(Duration::from_secs(5), server.handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(remaining, 0);

        drop(sender);
        let _ = conn_task.await;
    }

    #[tokio::test]
    async fn test_keep_alive_polling_outlives_connection_timeout() {
        let server = start_server_with(|cfg| cfg.performance.connection_timeout = 1).await;

        let stream = TcpStream::connect(server.addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        let conn_task = tokio::spawn(conn);

        // Four polls 600ms apart keep one connection busy well past the timeout
        for poll in 0..4 {
            if poll > 0 {
                tokio::time::sleep(Duration::from_millis(600)).await;
            }
            sender.ready().await.unwrap();
            let req = Request::builder()
                .uri("/api/controllers")
                .header("host", server.addr.to_string())
                .body(Empty::<Bytes>::new())
                .unwrap();
            let response = sender
                .send_request(req)
                .await
                .unwrap_or_else(|e| panic!("poll {poll} failed: {e}"));
            assert_eq!(response.status(), StatusCode::OK, "poll {poll}");
            response.into_body().collect().await.unwrap();
        }

        drop(sender);
        let _ = conn_task.await;

        server.shutdown.send(true).unwrap();
        let remaining = tokio::time::timeout(Duration::from_secs(5), server.handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
