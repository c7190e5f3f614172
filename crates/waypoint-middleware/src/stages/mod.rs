//! Built-in middleware stages.
//!
//! | Name            | Middleware                 | Purpose                                     |
//! |-----------------|----------------------------|---------------------------------------------|
//! | `logger`        | [`RequestLogMiddleware`]   | Log request start, status and duration      |
//! | `request_track` | [`RequestTrackMiddleware`] | Count requests per endpoint, attach metadata |
//! | `request_id`    | [`RequestIdMiddleware`]    | Echo the request ID on the response         |

pub mod request_id;
pub mod request_log;
pub mod request_track;

pub use request_id::RequestIdMiddleware;
pub use request_log::RequestLogMiddleware;
pub use request_track::{RequestCounter, RequestTrack, RequestTrackMiddleware};
