//! Request handler module
//!
//! Routing, the dashboard and CSV responders, and controller discovery output.

mod api;
pub mod request;
pub mod router;
mod static_files;

// Re-export main entry points
pub use request::handle_request;
pub use router::Router;
