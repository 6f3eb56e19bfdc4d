//! HTTP protocol layer module
//!
//! Response framing shared by every route: status, content type, length and cache policy.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{build_404_response, build_405_response, build_500_response, build_ok_response};
