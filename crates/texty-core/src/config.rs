//! Configuration loading and typed config structures for the Texty service.
//!
//! The canonical configuration lives in `texty-config.yaml`. This module
//! defines strongly-typed structs that mirror the YAML structure, and
//! provides a loader that reads and validates the file. Every field has a
//! default, so an absent file or section is not an error.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is not usable.
    #[error("invalid config value for {field}: {message}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServiceConfig {
    /// Listen address.
    #[serde(default)]
    pub server: ListenConfig,

    /// Frontend the root path redirects to.
    #[serde(default)]
    pub frontend: FrontendConfig,

    /// Subscriber buffering and keep-alive.
    #[serde(default)]
    pub subscribers: SubscriberConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServiceConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `TEXTY_HOST` overrides `server.host`
    /// - `TEXTY_PORT` overrides `server.port`
    /// - `TEXTY_FRONTEND_URL` overrides `frontend.url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without consulting the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Override fields with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `TEXTY_PORT` is not a port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("TEXTY_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("TEXTY_PORT") {
            self.server.port = val.parse().map_err(|e| ConfigError::Invalid {
                field: "server.port",
                message: format!("TEXTY_PORT={val}: {e}"),
            })?;
        }
        if let Ok(val) = std::env::var("TEXTY_FRONTEND_URL") {
            self.frontend.url = val;
        }
        Ok(())
    }

    /// Check cross-field and range constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero subscriber buffer, a
    /// zero keep-alive interval, or an empty frontend URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscribers.buffer_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "subscribers.buffer_capacity",
                message: "must be at least 1".to_owned(),
            });
        }
        if self.subscribers.keep_alive_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "subscribers.keep_alive_secs",
                message: "must be at least 1".to_owned(),
            });
        }
        if self.frontend.url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "frontend.url",
                message: "must not be empty".to_owned(),
            });
        }
        Ok(())
    }
}

/// Listen address for the HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenConfig {
    /// Host or IP address to bind (e.g. `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Frontend location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FrontendConfig {
    /// URL that `GET /` redirects browsers to.
    #[serde(default = "default_frontend_url")]
    pub url: String,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            url: default_frontend_url(),
        }
    }
}

/// Subscriber buffering and keep-alive settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubscriberConfig {
    /// Snapshots a subscriber may have queued before it is evicted.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Seconds between keep-alive comments on idle event streams.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8787
}

fn default_frontend_url() -> String {
    "http://localhost:8788".to_owned()
}

const fn default_buffer_capacity() -> usize {
    256
}

const fn default_keep_alive_secs() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.port, 8787);
        assert_eq!(config.subscribers.buffer_capacity, 256);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 9000

frontend:
  url: "https://texty.example.com"

subscribers:
  buffer_capacity: 32
  keep_alive_secs: 5

logging:
  level: "debug"
  json: true
"#;
        let config = ServiceConfig::parse(yaml);
        assert!(config.is_ok(), "parse failed: {config:?}");
        let config = config.unwrap_or_default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.frontend.url, "https://texty.example.com");
        assert_eq!(config.subscribers.buffer_capacity, 32);
        assert_eq!(config.subscribers.keep_alive_secs, 5);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = ServiceConfig::parse("server:\n  port: 1234\n");
        let config = config.unwrap_or_default();
        assert_eq!(config.server.port, 1234);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.frontend, FrontendConfig::default());
    }

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = ServiceConfig::parse("{}");
        assert_eq!(config.ok(), Some(ServiceConfig::default()));
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let result = ServiceConfig::parse("subscribers:\n  buffer_capacity: 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                field: "subscribers.buffer_capacity",
                ..
            })
        ));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let result = ServiceConfig::parse("server: [not, a, map");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }
}
