// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)
//
// A second signal while connections drain exits immediately.

use tokio::sync::{mpsc, watch};

use crate::logger;

/// Exit status used when a second signal cuts the drain short
const FORCED_EXIT_CODE: i32 = 130;

/// Register signal handlers and flip `shutdown` to `true` on the first one received.
///
/// Registration happens before this returns, so a failure surfaces at startup
/// rather than inside a background task.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: watch::Sender<bool>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    let (tx, rx) = mpsc::channel(2);

    tokio::spawn(async move {
        loop {
            let name = tokio::select! {
                Some(()) = sigterm.recv() => "SIGTERM",
                Some(()) = sigint.recv() => "SIGINT",
                else => break,
            };
            if tx.send(name).await.is_err() {
                break;
            }
        }
    });
    spawn_shutdown_task(rx, shutdown);
    Ok(())
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: watch::Sender<bool>) -> std::io::Result<()> {
    let (tx, rx) = mpsc::channel(2);

    tokio::spawn(async move {
        loop {
            if let Err(e) = tokio::signal::ctrl_c().await {
                logger::log_error(&format!("Failed to listen for Ctrl+C: {e}"));
                // Dropping the sender would read as a shutdown request
                std::future::pending::<()>().await;
            }
            if tx.send("Ctrl+C").await.is_err() {
                break;
            }
        }
    });
    spawn_shutdown_task(rx, shutdown);
    Ok(())
}

fn spawn_shutdown_task(signals: mpsc::Receiver<&'static str>, shutdown: watch::Sender<bool>) {
    tokio::spawn(async move {
        if let Some(name) = await_signals(signals, &shutdown).await {
            logger::log_warning(&format!(
                "{name} received during shutdown, exiting without waiting for open connections"
            ));
            std::process::exit(FORCED_EXIT_CODE);
        }
    });
}

/// Flip `shutdown` on the first signal and return the name of the second one.
///
/// Returns `None` if the signal source goes away first.
async fn await_signals(
    mut signals: mpsc::Receiver<&'static str>,
    shutdown: &watch::Sender<bool>,
) -> Option<&'static str> {
    let first = signals.recv().await?;
    logger::log_shutdown_requested(first);
    let _ = shutdown.send(true);
    signals.recv().await
}
