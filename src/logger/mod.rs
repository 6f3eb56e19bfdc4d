//! Logger module
//!
//! Operational output for the monitor:
//! - startup banner and shutdown notices
//! - access lines, by default only for error-class responses
//! - error and warning lines
//!
//! Falls back to stdout/stderr until `init` has been called.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::time::Duration;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info(&format!("mpr-monitor serving on http://{addr}"));
    write_info(&format!("  dashboard: {}", config.paths.html_dir));
    write_info(&format!(
        "  data:      {} ({} controllers)",
        config.paths.data_dir, config.controllers.count
    ));
    if let Some(workers) = config.server.workers {
        write_info(&format!("  workers:   {workers}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("  access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("  error log:  {path}"));
    }
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("\n{signal} received, shutting down."));
}

pub fn log_shutdown_complete(remaining: usize, waited: Duration) {
    if remaining == 0 {
        write_info(&format!(
            "All connections closed after {}ms. Bye.",
            waited.as_millis()
        ));
    } else {
        log_warning(&format!(
            "Shutdown timeout after {}s, abandoning {remaining} open connection(s)",
            waited.as_secs()
        ));
    }
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry; error-class entries go to the error log
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    let line = entry.format(format);
    if entry.status >= 400 {
        write_error(&line);
    } else {
        write_info(&line);
    }
}
