//! Response builders.
//!
//! All builders are infallible: a body that cannot be serialized turns into a
//! 500 envelope instead of a panic.

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

use crate::{DispatchError, HandlerError, Response};

/// Builds a JSON response with the given status.
pub fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_json_body(status, Bytes::from(bytes)),
        Err(e) => error(&DispatchError::handler(HandlerError::from(e))),
    }
}

/// `200 OK` with a JSON body.
pub fn ok<T: Serialize + ?Sized>(body: &T) -> Response {
    json(StatusCode::OK, body)
}

/// `201 Created` with a JSON body.
pub fn created<T: Serialize + ?Sized>(body: &T) -> Response {
    json(StatusCode::CREATED, body)
}

/// `204 No Content` with an empty body.
pub fn no_content() -> Response {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

/// Renders a dispatch error as its JSON envelope, adding `Allow` for 405s.
pub fn error(err: &DispatchError) -> Response {
    let status = err.status_code();
    // The envelope only holds strings and plain enums, so this cannot fail.
    let body = serde_json::to_vec(&err.to_envelope()).unwrap_or_default();
    let mut response = with_json_body(status, Bytes::from(body));
    if let Some(allow) = err.allow_header() {
        if let Ok(value) = HeaderValue::from_str(&allow) {
            response.headers_mut().insert(ALLOW, value);
        }
    }
    response
}

fn with_json_body(status: StatusCode, body: Bytes) -> Response {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
