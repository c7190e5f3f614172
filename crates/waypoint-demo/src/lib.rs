//! Waypoint demo service.
//!
//! | Method            | Pattern        | Route middleware |
//! |-------------------|----------------|------------------|
//! | GET               | `/`            |                  |
//! | GET, POST         | `/simple/:id?` | `request_track`  |
//! | GET, PATCH, DELETE| `/users/:id`   |                  |
//!
//! The `request_id` and `logger` middleware wrap every route, in that order.

#![doc(html_root_url = "https://docs.rs/waypoint-demo/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use waypoint::prelude::*;

pub mod routes;

/// Builds the demo application.
///
/// `counter` backs the `request_track` middleware; pass the same instance to
/// read counts back out. `base_path`, when set, prefixes every route.
pub fn build_app(
    counter: Arc<RequestCounter>,
    base_path: Option<&str>,
) -> Result<App, RegistrationError> {
    let mut builder = App::builder()
        .middleware(RequestIdMiddleware::new())
        .middleware(RequestLogMiddleware::new())
        .middleware(RequestTrackMiddleware::new(counter))
        .global("request_id")
        .global("logger")
        .route(routes::index::route())
        .route(routes::simple::route())
        .route(routes::users::route());

    if let Some(base_path) = base_path {
        builder = builder.base_path(base_path);
    }

    builder.build()
}
