//! Static file serving module
//!
//! Reads a whole resource into memory and frames it as one response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::error::ServeError;
use crate::http;
use crate::store::ResourceStore;

/// Serve `name` from `store` with the declared content type
pub fn serve_file(
    store: &dyn ResourceStore,
    name: &str,
    content_type: &str,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let content = store
        .read(name)
        .map_err(|e| ServeError::from_read(name, e))?;
    Ok(http::build_ok_response(content, content_type))
}
