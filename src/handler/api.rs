//! Controller list endpoint

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::controllers::ControllerSet;
use crate::error::ServeError;
use crate::http::{self, mime};
use crate::store::ResourceStore;

/// Probe the data directory and return the active controllers as a JSON array
pub fn serve_controller_list(
    data: &dyn ResourceStore,
    controllers: ControllerSet,
) -> Result<Response<Full<Bytes>>, ServeError> {
    let active = controllers.discover(data);
    let json = serde_json::to_vec(&active)?;
    Ok(http::build_ok_response(json, mime::APPLICATION_JSON))
}
