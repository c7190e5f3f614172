//! # Waypoint Core
//!
//! Core types shared by every Waypoint crate.
//!
//! - [`Request`] / [`Response`] - the buffered HTTP types the dispatcher works with
//! - [`RequestId`] - UUID v7 request identifier
//! - [`DispatchError`] - per-request failure taxonomy and its JSON envelope
//! - [`FieldError`] / [`ValidationErrors`] - structured validation failures
//! - [`HandlerError`] - failure returned by a route handler
//! - [`RegistrationError`] - startup-fatal route table errors
//! - [`response`] - helpers for building JSON responses
//!
//! ## Error envelope
//!
//! Every non-2xx response produced by the dispatcher has the same shape:
//!
//! ```json
//! {
//!   "error": "Bad Request",
//!   "message": "Request validation failed",
//!   "kind": "validation",
//!   "details": [
//!     { "source": "body", "field": "text", "message": "Message text is required", "code": "too_short" }
//!   ]
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/waypoint-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod request_id;
pub mod response;

pub use error::{
    DispatchError, ErrorEnvelope, ErrorKind, FieldError, HandlerError, InputSource,
    RegistrationError, ValidationErrors,
};
pub use request_id::RequestId;

/// Incoming request with a fully buffered body.
pub type Request = http::Request<bytes::Bytes>;

/// Outgoing response with a fully buffered body.
pub type Response = http::Response<http_body_util::Full<bytes::Bytes>>;
