//! Typed configuration for Waypoint.
//!
//! - TOML and JSON configuration files
//! - `.env` loading through `dotenvy`
//! - environment overrides (`WAYPOINT__SERVER__PORT`, or the `WAYPOINT_PORT` shortcut)
//! - strict parsing: unknown fields are errors
//!
//! # Configuration file format
//!
//! ```toml
//! base_path = "/api"
//! routes_dir = "./routes"
//! middleware_dir = "./middleware"
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//! max_body_bytes = 1048576
//!
//! [docs]
//! enabled = true
//! path = "/docs"
//! theme = "purple"
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::WaypointConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{DocsConfig, LogFormat, LoggingConfig, ServerConfig};
