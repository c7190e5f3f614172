//! The root configuration type.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, DocsConfig, LogFormat, LoggingConfig, ServerConfig};

const LOG_LEVELS: [&str; 6] = ["trace", "debug", "info", "warn", "error", "off"];

/// Complete Waypoint application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to layer files and environment
/// variables over the defaults.
///
/// ```
/// use waypoint_config::WaypointConfig;
///
/// let config = WaypointConfig::default();
/// assert_eq!(config.server.port, 3000);
/// assert_eq!(config.routes_dir, "./routes");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct WaypointConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Prefix applied to every route, e.g. `/api`.
    #[serde(default)]
    pub base_path: Option<String>,

    /// Directory holding route modules.
    #[serde(default = "default_routes_dir")]
    pub routes_dir: String,

    /// Directory holding middleware modules.
    #[serde(default = "default_middleware_dir")]
    pub middleware_dir: String,

    /// API documentation settings.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for WaypointConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            base_path: None,
            routes_dir: default_routes_dir(),
            middleware_dir: default_middleware_dir(),
            docs: DocsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_routes_dir() -> String {
    "./routes".to_string()
}

fn default_middleware_dir() -> String {
    "./middleware".to_string()
}

impl WaypointConfig {
    /// Local development preset: loopback, debug logs, pretty output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                ..ServerConfig::default()
            },
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            ..Self::default()
        }
    }

    /// Production preset: info logs as JSON, docs disabled.
    #[must_use]
    pub fn production() -> Self {
        Self {
            docs: DocsConfig {
                enabled: false,
                ..DocsConfig::default()
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
            ..Self::default()
        }
    }

    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid_value("server.port", "must not be 0"));
        }
        if self.server.socket_addr().is_err() {
            return Err(ConfigError::invalid_value(
                "server.host",
                format!("not an IP address: {}", self.server.host),
            ));
        }
        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than 0",
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "server.max_body_bytes",
                "must be greater than 0",
            ));
        }
        if let Some(base) = &self.base_path {
            if !base.starts_with('/') {
                return Err(ConfigError::invalid_value("base_path", "must start with '/'"));
            }
        }
        if !self.docs.path.starts_with('/') {
            return Err(ConfigError::invalid_value("docs.path", "must start with '/'"));
        }
        if !is_valid_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unrecognized level or directive: {}", self.logging.level),
            ));
        }
        Ok(())
    }
}

/// Accepts `info` or directives like `waypoint_server=debug,warn`.
fn is_valid_filter(filter: &str) -> bool {
    !filter.trim().is_empty()
        && filter.split(',').all(|directive| {
            let level = directive.rsplit('=').next().unwrap_or_default().trim();
            LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(WaypointConfig::development().validate().is_ok());
        assert!(WaypointConfig::production().validate().is_ok());
        assert_eq!(WaypointConfig::production().logging.format, LogFormat::Json);
        assert!(!WaypointConfig::production().docs.enabled);
    }

    #[test]
    fn test_rejects_zero_port() {
        let mut config = WaypointConfig::default();
        config.server.port = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.port"));
    }

    #[test]
    fn test_rejects_zero_body_limit() {
        let mut config = WaypointConfig::default();
        config.server.max_body_bytes = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.max_body_bytes"));
    }

    #[test]
    fn test_rejects_relative_base_path() {
        let config = WaypointConfig {
            base_path: Some("api".to_string()),
            ..WaypointConfig::default()
        };
        assert!(config.validate().is_err());

        let config = WaypointConfig {
            base_path: Some("/api".to_string()),
            ..WaypointConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_log_filters() {
        assert!(is_valid_filter("info"));
        assert!(is_valid_filter("WARN"));
        assert!(is_valid_filter("waypoint_server=debug,warn"));
        assert!(!is_valid_filter("loud"));
        assert!(!is_valid_filter(""));
    }

    #[test]
    fn test_full_toml_document() {
        let config: WaypointConfig = toml::from_str(
            r#"
            base_path = "/api"
            routes_dir = "./src/routes"

            [server]
            port = 8080

            [docs]
            theme = "dark"

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.base_path.as_deref(), Some("/api"));
        assert_eq!(config.routes_dir, "./src/routes");
        assert_eq!(config.middleware_dir, "./middleware");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.docs.theme, "dark");
        assert_eq!(config.docs.path, "/docs");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_top_level_field() {
        assert!(toml::from_str::<WaypointConfig>("telemetry = true").is_err());
    }
}
