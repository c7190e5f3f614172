//! # Waypoint
//!
//! **A small HTTP routing, validation and middleware engine.**
//!
//! - Path patterns with named, optional and wildcard captures
//! - Declarative request schemas for query, path params and JSON bodies
//! - Onion-ordered middleware: global units wrap route units wrap the handler
//! - A uniform JSON error envelope for 400, 404, 405, 500 and 504
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use waypoint::prelude::*;
//!
//! async fn hello(_ctx: RequestContext) -> Result<Response, HandlerError> {
//!     Ok(response::ok(&"hello"))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = App::builder()
//!         .middleware(RequestLogMiddleware::new())
//!         .global("logger")
//!         .route(RouteDefinition::new("/").get(MethodDefinition::new(hello)))
//!         .build()?;
//!
//!     Server::new("127.0.0.1:3000".parse()?, Arc::new(app)).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Request flow
//!
//! ```text
//! Request → Router → global middleware → route middleware → Validation → Handler
//!                                                                          ↓
//! Response ←─────────── post-phases run in reverse order ←─────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use waypoint_core as core;

// Re-export router types
pub use waypoint_router as router;

// Re-export schema types
pub use waypoint_schema as schema;

// Re-export middleware types
pub use waypoint_middleware as middleware;

// Re-export server types
pub use waypoint_server as server;

// Re-export configuration types
pub use waypoint_config as config;

// Re-export logging setup
pub use waypoint_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use waypoint::prelude::*;
/// ```
pub mod prelude {
    pub use waypoint_core::{
        response, DispatchError, HandlerError, RegistrationError, Request, RequestId, Response,
    };

    pub use waypoint_schema::{RequestSchema, Shape};

    pub use waypoint_middleware::stages::{
        RequestCounter, RequestIdMiddleware, RequestLogMiddleware, RequestTrack,
        RequestTrackMiddleware,
    };
    pub use waypoint_middleware::{FnMiddleware, Middleware, Next, RequestContext};

    pub use waypoint_server::{App, MethodDefinition, RouteDefinition, Server, ShutdownSignal};

    pub use waypoint_config::{ConfigLoader, WaypointConfig};
    pub use waypoint_telemetry::{init_logging, LogConfig};
}
