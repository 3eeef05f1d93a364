//! Shared application state for the Texty API server.

use std::sync::Arc;
use std::time::Duration;

use texty_core::{LockCoordinator, ServiceConfig};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor. All
/// document access goes through the [`LockCoordinator`]; the handlers
/// carry no lock policy of their own.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Sequencer owning the document and the subscriber registry.
    pub coordinator: Arc<LockCoordinator>,
    /// Where `GET /` redirects browsers.
    pub frontend_url: String,
    /// Interval between keep-alive comments on idle SSE streams.
    pub keep_alive: Duration,
}

impl AppState {
    /// Build the state from service configuration.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            coordinator: Arc::new(LockCoordinator::from_config(&config.subscribers)),
            frontend_url: config.frontend.url.clone(),
            keep_alive: Duration::from_secs(config.subscribers.keep_alive_secs),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ServiceConfig::default())
    }
}
