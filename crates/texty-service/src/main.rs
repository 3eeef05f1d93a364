//! Texty service binary.
//!
//! Wires together configuration, structured logging, the lock
//! coordinator, and the HTTP server, then serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `texty-config.yaml` (or `TEXTY_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Create the shared application state
//! 4. Serve until `Ctrl-C`, then end all push streams and stop

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use texty_core::ServiceConfig;
use texty_core::config::LoggingConfig;
use texty_server::AppState;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ServiceError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "texty-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, or the server fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration. Logging is not up yet, so remember whether
    //    defaults were used and report it afterwards.
    let (config, config_path) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("texty starting");
    match &config_path {
        Some(path) => info!(path = %path.display(), "Configuration loaded"),
        None => info!("Config file not found, using defaults"),
    }
    info!(
        host = config.server.host,
        port = config.server.port,
        frontend_url = config.frontend.url,
        buffer_capacity = config.subscribers.buffer_capacity,
        keep_alive_secs = config.subscribers.keep_alive_secs,
        "Effective configuration"
    );

    // 3. Create shared state.
    let state = Arc::new(AppState::new(&config));

    // 4. Serve until Ctrl-C.
    let coordinator = Arc::clone(&state.coordinator);
    let shutdown = async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
        }
        info!("Shutdown requested");
        coordinator.disconnect_all();
    };

    texty_server::start_server(&config.server, state, shutdown)
        .await
        .map_err(ServiceError::from)?;

    info!("texty shutdown complete");
    Ok(())
}

/// Load configuration from `TEXTY_CONFIG` or `texty-config.yaml`.
///
/// Returns the path that was read, or `None` when no file exists and the
/// defaults (plus environment overrides) are used.
fn load_config() -> Result<(ServiceConfig, Option<PathBuf>), ServiceError> {
    let path = std::env::var_os("TEXTY_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = ServiceConfig::from_file(&path)?;
        Ok((config, Some(path)))
    } else {
        let mut config = ServiceConfig::default();
        config.apply_env_overrides()?;
        config.validate()?;
        Ok((config, None))
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(logging: &LoggingConfig) -> Result<(), ServiceError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| ServiceError::Logging {
            message: format!("invalid log level {:?}: {e}", logging.level),
        })?;

    let installed = if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    };

    installed.map_err(|e| ServiceError::Logging {
        message: format!("failed to install subscriber: {e}"),
    })
}
