//! Request routing module
//!
//! Maps a GET request target onto one of three responders through an ordered
//! table of (matcher, handler) pairs. The router is synchronous and holds only
//! immutable state, so one instance is shared by every connection.

use std::sync::Arc;

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::controllers::ControllerSet;
use crate::error::ServeError;
use crate::handler::{api, static_files};
use crate::http::{self, mime};
use crate::logger;
use crate::store::ResourceStore;

const INDEX_FILE: &str = "index.html";
const CONTROLLERS_PATH: &str = "/api/controllers";
const DATA_PREFIX: &str = "/data/";
const CSV_SUFFIX: &str = ".csv";

type HandlerResult = Result<Response<Full<Bytes>>, ServeError>;

/// One row of the route table
struct Route {
    name: &'static str,
    matches: fn(&str) -> bool,
    handle: fn(&Router, &str) -> HandlerResult,
}

/// Checked in order; first match wins
const ROUTES: &[Route] = &[
    Route {
        name: "index",
        matches: is_index,
        handle: Router::serve_index,
    },
    Route {
        name: "controllers",
        matches: is_controller_list,
        handle: Router::serve_controllers,
    },
    Route {
        name: "data",
        matches: is_data_csv,
        handle: Router::serve_data,
    },
];

fn is_index(path: &str) -> bool {
    path == "/" || path == "/index.html"
}

fn is_controller_list(path: &str) -> bool {
    path == CONTROLLERS_PATH
}

fn is_data_csv(path: &str) -> bool {
    path.starts_with(DATA_PREFIX) && path.ends_with(CSV_SUFFIX)
}

/// Drop the query string, if any
pub fn normalize_path(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

/// Final segment of a URL path; every directory component is discarded
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Request router over the dashboard and data directories
pub struct Router {
    site: Arc<dyn ResourceStore>,
    data: Arc<dyn ResourceStore>,
    controllers: ControllerSet,
}

impl Router {
    pub fn new(
        site: Arc<dyn ResourceStore>,
        data: Arc<dyn ResourceStore>,
        controllers: ControllerSet,
    ) -> Self {
        Self {
            site,
            data,
            controllers,
        }
    }

    /// Produce the response for a GET of `target` (path with optional query)
    pub fn respond(&self, target: &str) -> Response<Full<Bytes>> {
        let path = normalize_path(target);
        let Some(route) = ROUTES.iter().find(|route| (route.matches)(path)) else {
            return http::build_404_response(&format!("No route for {path}"));
        };

        match (route.handle)(self, path) {
            Ok(response) => response,
            Err(ServeError::NotFound(message)) => http::build_404_response(&message),
            Err(err) => {
                logger::log_error(&format!("{} route failed for {path}: {err}", route.name));
                http::build_500_response()
            }
        }
    }

    fn serve_index(&self, _path: &str) -> HandlerResult {
        static_files::serve_file(self.site.as_ref(), INDEX_FILE, mime::TEXT_HTML)
    }

    fn serve_controllers(&self, _path: &str) -> HandlerResult {
        api::serve_controller_list(self.data.as_ref(), self.controllers)
    }

    /// Only the basename is considered, and it must pass the allow-list, so the
    /// file opened is always directly inside the data directory.
    fn serve_data(&self, path: &str) -> HandlerResult {
        let name = basename(path);
        if self.controllers.parse_csv_name(name).is_none() {
            return Err(ServeError::NotFound(format!("No such data file: {name}")));
        }
        static_files::serve_file(self.data.as_ref(), name, mime::TEXT_CSV)
    }
}
