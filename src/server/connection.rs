// Connection handling module
// Serves one TCP connection and tracks how many are still open

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{watch, Notify};

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Counts live connections and wakes waiters when the count drops to zero
#[derive(Debug, Default)]
pub struct ConnectionTracker {
    active: AtomicUsize,
    idle: Notify,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Register a connection; it is released when the guard drops
    pub fn track(self: &Arc<Self>) -> ConnectionGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Resolve once no connection is open
    pub async fn wait_idle(&self) {
        loop {
            // Register interest before checking so a concurrent release is not missed
            let notified = self.idle.notified();
            if self.active() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Keeps one connection counted while alive
pub struct ConnectionGuard {
    tracker: Arc<ConnectionTracker>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.tracker.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.tracker.idle.notify_waiters();
        }
    }
}

/// Serve a single connection in a spawned task.
///
/// `performance.connection_timeout` bounds how long the connection may wait for
/// the next request head, so a keep-alive client polling more often than that
/// keeps its connection. When the shutdown channel flips, hyper finishes the
/// in-flight request and closes.
///
/// # Arguments
///
/// * `stream` - The accepted TCP stream
/// * `peer_addr` - Remote address, used for access logging
/// * `state` - Shared application state
/// * `tracker` - Live connection counter
/// * `shutdown` - Receiver that flips to `true` on shutdown
pub fn spawn_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    tracker: &Arc<ConnectionTracker>,
    mut shutdown: watch::Receiver<bool>,
) {
    let guard = tracker.track();

    tokio::spawn(async move {
        let _guard = guard;
        let io = TokioIo::new(stream);

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(state.config.connection_timeout())
            .keep_alive(state.config.performance.keep_alive);

        let service_state = Arc::clone(&state);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                handler::handle_request(req, Arc::clone(&service_state), peer_addr)
            }),
        );

        let serve = async {
            tokio::pin!(conn);
            let mut draining = *shutdown.borrow();
            if draining {
                conn.as_mut().graceful_shutdown();
            }
            loop {
                tokio::select! {
                    result = conn.as_mut() => break result,
                    changed = shutdown.changed(), if !draining => {
                        draining = true;
                        if changed.is_ok() {
                            conn.as_mut().graceful_shutdown();
                        }
                    }
                }
            }
        };

        if let Err(err) = serve.await {
            // Idle keep-alive sockets closed by either side are routine
            if !err.is_incomplete_message() && !err.is_timeout() {
                logger::log_connection_error(&err);
            }
        }
    });
}
