//! Waypoint demo service binary.
//!
//! Configuration comes from `waypoint.toml` (or the file named by
//! `WAYPOINT_CONFIG_FILE`), then `.env`, then `WAYPOINT__*` variables.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::info;
use waypoint::config::{LogFormat, LoggingConfig, DEFAULT_ENV_PREFIX};
use waypoint::prelude::*;

const DEFAULT_CONFIG_FILE: &str = "waypoint.toml";

// =============================================================================
// Startup
// =============================================================================

fn load_config() -> anyhow::Result<WaypointConfig> {
    let path = std::env::var("WAYPOINT_CONFIG_FILE")
        .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

    let config = ConfigLoader::new()
        .with_optional_file(&path)?
        .with_dotenv()?
        .with_env_prefix(DEFAULT_ENV_PREFIX)
        .load()
        .with_context(|| format!("invalid configuration (file: {path})"))?;
    Ok(config)
}

fn log_config(logging: &LoggingConfig) -> LogConfig {
    LogConfig::default()
        .with_level(logging.level.clone())
        .with_json(logging.format == LogFormat::Json)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_logging(&log_config(&config.logging)).context("failed to initialize logging")?;

    let counter = Arc::new(RequestCounter::new());
    let app = waypoint_demo::build_app(counter, config.base_path.as_deref())
        .context("failed to build route table")?;

    for route in app.routes() {
        info!(
            method = %route.method,
            route = %route.pattern,
            summary = route.summary().unwrap_or_default(),
            "route registered"
        );
    }
    info!(
        routes_dir = %config.routes_dir,
        middleware_dir = %config.middleware_dir,
        docs_enabled = config.docs.enabled,
        "configuration loaded"
    );

    let addr = config
        .server
        .socket_addr()
        .context("invalid server address")?;

    Server::new(addr, Arc::new(app))
        .request_timeout(Duration::from_millis(config.server.request_timeout_ms))
        .shutdown_timeout(Duration::from_secs(config.server.shutdown_timeout_secs))
        .max_body_size(config.server.max_body_bytes)
        .run()
        .await?;

    info!("server stopped");
    Ok(())
}
