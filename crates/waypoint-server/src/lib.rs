//! # Waypoint Server
//!
//! Route definitions, the request dispatcher and the HTTP transport.
//!
//! - [`RouteDefinition`] / [`MethodDefinition`] - per-path, per-method schema,
//!   middleware names and handler
//! - [`App`] - the immutable route table; [`App::dispatch`] turns any request
//!   into a response
//! - [`Server`] - hyper-based HTTP/1.1 server with request timeouts and
//!   graceful shutdown
//!
//! ## Example
//!
//! ```rust
//! use waypoint_core::{response, HandlerError, Response};
//! use waypoint_middleware::RequestContext;
//! use waypoint_server::{App, MethodDefinition, RouteDefinition};
//!
//! async fn get_user(ctx: RequestContext) -> Result<Response, HandlerError> {
//!     Ok(response::ok(&serde_json::json!({ "id": ctx.param("id") })))
//! }
//!
//! let app = App::builder()
//!     .route(RouteDefinition::new("/users/:id").get(MethodDefinition::new(get_user)))
//!     .build()
//!     .unwrap();
//!
//! let request = http::Request::get("/users/7").body(bytes::Bytes::new()).unwrap();
//! let response = tokio_test::block_on(app.dispatch(request));
//! assert_eq!(response.status(), http::StatusCode::OK);
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod app;
pub mod handler;
pub mod route;
pub mod server;
pub mod shutdown;

pub use app::{App, AppBuilder, RouteInfo};
pub use handler::{erase, ErasedHandler};
pub use route::{MethodDefinition, RouteDefinition, RouteDoc};
pub use server::{Server, ServerError};
pub use shutdown::ShutdownSignal;
