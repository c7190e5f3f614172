//! # Waypoint Middleware
//!
//! Request context and composable middleware chain for the Waypoint dispatcher.
//!
//! Unlike a fixed pipeline, a Waypoint chain is assembled per route method
//! from named middleware: every global middleware in registration order, then
//! the route's own middleware in declaration order.
//!
//! ```text
//! Request → logger → request_track → validation → handler
//!                                                    ↓
//! Response ← logger ← request_track ←────────────────┘
//! ```
//!
//! ## Built-in stages
//!
//! | Name            | Middleware                              | Purpose                               |
//! |-----------------|-----------------------------------------|---------------------------------------|
//! | `logger`        | [`stages::RequestLogMiddleware`]        | Access log with status and duration   |
//! | `request_track` | [`stages::RequestTrackMiddleware`]      | Per-endpoint request counting         |
//! | `request_id`    | [`stages::RequestIdMiddleware`]         | Echo `x-request-id` on responses      |
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use waypoint_middleware::stages::{RequestCounter, RequestLogMiddleware, RequestTrackMiddleware};
//! use waypoint_middleware::MiddlewareRegistry;
//!
//! let counter = Arc::new(RequestCounter::new());
//! let mut registry = MiddlewareRegistry::new();
//! registry.register(RequestLogMiddleware::new()).unwrap();
//! registry.register(RequestTrackMiddleware::new(counter)).unwrap();
//!
//! let chain = registry.resolve(&["logger"], &["request_track"], "GET /simple").unwrap();
//! assert_eq!(chain.len(), 2);
//! ```
//!
//! ## Failure isolation
//!
//! A panic inside any stage or handler is caught by the enclosing
//! [`Next::run`] and converted into a 500 response, so the post-phases of
//! outer middleware (including `logger`) still run.

#![doc(html_root_url = "https://docs.rs/waypoint-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
pub mod context;
pub mod middleware;
pub mod registry;
pub mod stages;

pub use chain::Chain;
pub use context::{RequestContext, REQUEST_ID_HEADER};
pub use middleware::{BoxFuture, BoxedMiddleware, Endpoint, FnMiddleware, Middleware, Next};
pub use registry::MiddlewareRegistry;
