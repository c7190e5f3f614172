//! Request logging middleware.
//!
//! Logs `→ METHOD /path` when a request enters the chain and
//! `← METHOD /path STATUS (Nms)` when its response leaves it. The completion
//! level follows the status: `error` for 5xx, `warn` for 4xx, `info`
//! otherwise.

use waypoint_core::Response;

use crate::context::RequestContext;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Access log middleware, registered as `logger`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogMiddleware;

impl RequestLogMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestLogMiddleware {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn process<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let request_id = ctx.request_id();
            let method = ctx.method().clone();
            let path = ctx.path().to_string();

            tracing::info!(
                request_id = %request_id,
                http.method = %method,
                http.path = %path,
                "→ {method} {path}"
            );

            let response = next.run(ctx).await;

            let status = response.status().as_u16();
            let duration_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX);

            if status >= 500 {
                tracing::error!(
                    request_id = %request_id,
                    http.method = %method,
                    http.path = %path,
                    http.status_code = status,
                    duration_ms,
                    "← {method} {path} {status} ({duration_ms}ms)"
                );
            } else if status >= 400 {
                tracing::warn!(
                    request_id = %request_id,
                    http.method = %method,
                    http.path = %path,
                    http.status_code = status,
                    duration_ms,
                    "← {method} {path} {status} ({duration_ms}ms)"
                );
            } else {
                tracing::info!(
                    request_id = %request_id,
                    http.method = %method,
                    http.path = %path,
                    http.status_code = status,
                    duration_ms,
                    "← {method} {path} {status} ({duration_ms}ms)"
                );
            }

            response
        })
    }
}
