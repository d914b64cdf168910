//! Shared launcher state handed to every route.

use std::sync::Arc;

use crate::config::LauncherConfig;
use crate::error::ServerError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<LauncherConfig>,
    /// Client reused for every relayed `/conversation` request.
    pub http: reqwest::Client,
}

impl AppState {
    /// # Errors
    ///
    /// Returns [`ServerError::HttpClient`] if the upstream client fails to
    /// build.
    pub fn new(config: LauncherConfig) -> Result<Self, ServerError> {
        // No overall timeout: replies stream for as long as the backend writes.
        let http = reqwest::Client::builder()
            .connect_timeout(config.upstream_connect_timeout)
            .build()
            .map_err(|e| ServerError::HttpClient(e.to_string()))?;
        Ok(Self { config: Arc::new(config), http })
    }
}
