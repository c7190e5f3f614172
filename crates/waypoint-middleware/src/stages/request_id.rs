//! Request ID middleware.
//!
//! The context already reuses a valid incoming `x-request-id` or generates a
//! UUID v7. This stage copies that ID onto the response so clients can
//! correlate their requests with server logs.

use http::HeaderValue;
use waypoint_core::Response;

use crate::context::{RequestContext, REQUEST_ID_HEADER};
use crate::middleware::{BoxFuture, Middleware, Next};

/// Sets `x-request-id` on every response.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdMiddleware;

impl RequestIdMiddleware {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let mut response = next.run(ctx).await;
            if let Ok(value) = HeaderValue::from_str(&ctx.request_id().to_string()) {
                response.headers_mut().insert(REQUEST_ID_HEADER, value);
            }
            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Endpoint;
    use bytes::Bytes;
    use waypoint_core::{response, RequestId};

    struct Ok200;

    impl Endpoint for Ok200 {
        fn call<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, Response> {
            Box::pin(async { response::no_content() })
        }
    }

    #[tokio::test]
    async fn test_echoes_generated_id() {
        let mut ctx = RequestContext::new(http::Request::get("/").body(Bytes::new()).unwrap());
        let response = RequestIdMiddleware::new()
            .process(&mut ctx, Next::endpoint(&Ok200))
            .await;

        let header = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert_eq!(header, ctx.request_id().to_string());
    }

    #[tokio::test]
    async fn test_echoes_incoming_id() {
        let incoming = RequestId::new();
        let request = http::Request::get("/")
            .header(REQUEST_ID_HEADER, incoming.to_string())
            .body(Bytes::new())
            .unwrap();
        let mut ctx = RequestContext::new(request);

        let response = RequestIdMiddleware::new()
            .process(&mut ctx, Next::endpoint(&Ok200))
            .await;
        assert_eq!(response.headers()[REQUEST_ID_HEADER], incoming.to_string());
    }
}
