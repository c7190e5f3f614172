//! # Waypoint Telemetry
//!
//! Structured logging for Waypoint applications, built on `tracing` and
//! `tracing-subscriber`.
//!
//! ```rust,no_run
//! use waypoint_telemetry::{init_logging, LogConfig};
//!
//! # fn main() -> Result<(), waypoint_telemetry::TelemetryError> {
//! init_logging(&LogConfig::development())?;
//! tracing::info!(http.method = "GET", http.path = "/", "request started");
//! # Ok(())
//! # }
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
