// Application state module
// Immutable per-process state shared by every connection

use std::sync::Arc;

use super::types::Config;
use crate::error::StartupError;
use crate::handler::Router;
use crate::store::FsStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: Arc<Router>,
}

impl AppState {
    /// Build the router from the configured directories and controller range
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let router = Router::new(
            Arc::new(FsStore::new(&config.paths.html_dir)),
            Arc::new(FsStore::new(&config.paths.data_dir)),
            config.controller_set()?,
        );

        Ok(Self {
            config: config.clone(),
            router: Arc::new(router),
        })
    }
}
