//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, LogFormat, WaypointConfig};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "WAYPOINT";

/// Loads a [`WaypointConfig`] in layers, later layers winning:
///
/// 1. defaults (or a preset)
/// 2. a TOML or JSON file
/// 3. a `.env` file, which only populates the process environment
/// 4. environment variables `PREFIX__SECTION__KEY`, plus `PREFIX_PORT`
///
/// ```no_run
/// use waypoint_config::ConfigLoader;
///
/// # fn main() -> Result<(), waypoint_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("waypoint.toml")?
///     .with_dotenv()?
///     .with_env_prefix("WAYPOINT")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ConfigLoader {
    config: WaypointConfig,
    env_prefix: Option<String>,
    env_overrides: Option<Vec<(String, String)>>,
}

impl ConfigLoader {
    /// Starts from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from [`WaypointConfig::development`].
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = WaypointConfig::development();
        self
    }

    /// Starts from [`WaypointConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = WaypointConfig::production();
        self
    }

    /// Loads a `.toml` or `.json` file. Fields it omits take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file is missing, unreadable, malformed, has an unknown
    /// field or an unsupported extension.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.config = parse(&content, &format)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file is skipped.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in the given format (`toml`, `json`).
    ///
    /// ```
    /// use waypoint_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nport = 8080", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    /// assert_eq!(config.server.port, 8080);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails on malformed content or an unsupported format.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Loads `.env` from the working directory into the process environment.
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Fails if `.env` exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Enables environment overrides under `prefix`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Uses `vars` instead of the process environment for overrides.
    #[must_use]
    pub fn with_env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env_overrides = Some(
            vars.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Applies environment overrides, validates and returns the config.
    ///
    /// # Errors
    ///
    /// Fails on an unparsable override or an invalid final value.
    pub fn load(mut self) -> Result<WaypointConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars = match self.env_overrides.take() {
                Some(vars) => vars,
                None => env::vars().collect(),
            };
            for (key, value) in vars {
                self.apply_env_var(&prefix, &key, &value)?;
            }
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the config without overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> WaypointConfig {
        self.config
    }

    fn apply_env_var(&mut self, prefix: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix) else {
            return Ok(());
        };

        if rest == "_PORT" {
            self.config.server.port = parse_port(key, value)?;
            return Ok(());
        }

        let Some(path) = rest.strip_prefix("__") else {
            return Ok(());
        };
        let parts: Vec<&str> = path.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HOST"] => config.server.host = value.to_string(),
            ["SERVER", "PORT"] => config.server.port = parse_port(key, value)?,
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                config.server.request_timeout_ms = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => {
                config.server.max_body_bytes = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["BASE_PATH"] => {
                config.base_path = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["ROUTES_DIR"] => config.routes_dir = value.to_string(),
            ["MIDDLEWARE_DIR"] => config.middleware_dir = value.to_string(),
            ["DOCS", "ENABLED"] => {
                config.docs.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["DOCS", "PATH"] => config.docs.path = value.to_string(),
            ["DOCS", "THEME"] => config.docs.theme = value.to_string(),
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            _ => {}
        }
        Ok(())
    }
}

fn parse(content: &str, format: &str) -> Result<WaypointConfig, ConfigError> {
    match format {
        "toml" => Ok(toml::from_str(content)?),
        "json" => Ok(serde_json::from_str(content)?),
        other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected port number"))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, WaypointConfig::default());
    }

    #[test]
    fn test_toml_file() {
        let file = temp_file(".toml", "base_path = \"/api\"\n[server]\nport = 4000\n");
        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.base_path.as_deref(), Some("/api"));
    }

    #[test]
    fn test_json_file() {
        let file = temp_file(".json", r#"{"docs": {"enabled": false}}"#);
        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert!(!config.docs.enabled);
        assert_eq!(config.docs.theme, "purple");
    }

    #[test]
    fn test_missing_and_optional_files() {
        let err = ConfigLoader::new().with_file("/no/such/waypoint.toml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));

        let loader = ConfigLoader::new()
            .with_optional_file("/no/such/waypoint.toml")
            .unwrap();
        assert_eq!(loader.load().unwrap().server.port, 3000);
    }

    #[test]
    fn test_unsupported_extension() {
        let file = temp_file(".yaml", "server: {}");
        let err = ConfigLoader::new().with_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ref f) if f == "yaml"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let file = temp_file(".toml", "[server]\nworkers = 4\n");
        assert!(matches!(
            ConfigLoader::new().with_file(file.path()),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let config = ConfigLoader::new()
            .with_env_prefix("WAYPOINT")
            .with_env_vars([
                ("WAYPOINT__SERVER__HOST", "127.0.0.1"),
                ("WAYPOINT__SERVER__REQUEST_TIMEOUT_MS", "500"),
                ("WAYPOINT__SERVER__MAX_BODY_BYTES", "4096"),
                ("WAYPOINT__BASE_PATH", "/v1"),
                ("WAYPOINT__DOCS__ENABLED", "off"),
                ("WAYPOINT__LOGGING__FORMAT", "json"),
                ("WAYPOINT__UNKNOWN__KEY", "ignored"),
                ("OTHER_PORT", "1"),
            ])
            .load()
            .unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.request_timeout_ms, 500);
        assert_eq!(config.server.max_body_bytes, 4096);
        assert_eq!(config.base_path.as_deref(), Some("/v1"));
        assert!(!config.docs.enabled);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_port_shortcut() {
        let config = ConfigLoader::new()
            .with_env_prefix("waypoint")
            .with_env_vars([("WAYPOINT_PORT", "8081")])
            .load()
            .unwrap();
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_env_parse_errors() {
        let err = ConfigLoader::new()
            .with_env_prefix("WAYPOINT")
            .with_env_vars([("WAYPOINT_PORT", "eighty")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "WAYPOINT_PORT"));

        let err = ConfigLoader::new()
            .with_env_prefix("WAYPOINT")
            .with_env_vars([("WAYPOINT__LOGGING__FORMAT", "xml")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_env_values_are_validated() {
        let err = ConfigLoader::new()
            .with_env_prefix("WAYPOINT")
            .with_env_vars([("WAYPOINT__SERVER__PORT", "0")])
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_presets() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.level, "debug");
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_with_string_formats() {
        let config = ConfigLoader::new()
            .with_string(r#"{"server": {"port": 9000}}"#, "JSON")
            .unwrap()
            .load_unvalidated();
        assert_eq!(config.server.port, 9000);
        assert!(ConfigLoader::new().with_string("", "ini").is_err());
    }
}
