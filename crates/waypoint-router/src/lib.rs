//! Segment tree router for Waypoint.
//!
//! Resolves a request path to the per-method table registered for it.
//!
//! # Features
//!
//! - **Named captures**: `/users/:id`
//! - **Optional trailing captures**: `/simple/:id?` registers `/simple` and `/simple/:id`
//! - **Wildcards**: `/files/*path` captures every remaining segment
//! - **405 support**: a path match with no entry for the method reports the allowed methods
//! - **Startup checks**: duplicate `(method, path)` pairs and ambiguous captures are errors
//!
//! # Example
//!
//! ```rust
//! use waypoint_router::{MethodRouter, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/users/:id", MethodRouter::new().get("getUser").delete("deleteUser")).unwrap();
//! router.insert("/files/*path", MethodRouter::new().get("serveFile")).unwrap();
//!
//! let found = router.match_route(&Method::GET, "/files/img/logo.png").unwrap();
//! assert_eq!(*found.value, "serveFile");
//! assert_eq!(found.params.get("path"), Some("img/logo.png"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!           "simple"        "users"
//!         [GET,POST]           │
//!              │             ":id"
//!            ":id"      [GET,PATCH,DELETE]
//!         [GET,POST]
//! ```

mod method_router;
mod node;
mod params;
mod pattern;
mod router;

pub use method_router::MethodRouter;
pub use params::Params;
pub use pattern::{Pattern, Segment};
pub use router::Router;

use http::Method;

/// A successful match: the registered value and the captured parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, T> {
    /// The value registered for the matched method.
    pub value: &'a T,
    /// Captured path parameters.
    pub params: Params,
}

/// Outcome of [`Router::lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    /// Path and method matched.
    Matched(RouteMatch<'a, T>),
    /// The path matched; the method did not. Carries the allowed methods.
    MethodNotAllowed(Vec<Method>),
    /// No registered pattern matches the path.
    NotFound,
}

/// Route registration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The pattern could not be parsed.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The method is already registered for this path.
    #[error("duplicate route: {method} {pattern}")]
    Duplicate {
        /// The duplicated method.
        method: Method,
        /// The concrete pattern that collided.
        pattern: String,
    },

    /// A different capture name already occupies the same position.
    #[error("pattern '{pattern}' captures ':{new}' where ':{existing}' is already registered")]
    ConflictingCapture {
        /// The pattern being registered.
        pattern: String,
        /// The capture already in the tree.
        existing: String,
        /// The capture that was refused.
        new: String,
    },
}
