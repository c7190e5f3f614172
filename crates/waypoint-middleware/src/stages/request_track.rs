//! Per-endpoint request tracking.
//!
//! [`RequestTrackMiddleware`] counts requests per endpoint in a shared
//! [`RequestCounter`] and attaches a [`RequestTrack`] extension that handlers
//! can read. The endpoint ID is `METHOD:/actual/path`, so `/simple/1` and
//! `/simple/2` are counted separately.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use waypoint_core::Response;

use crate::context::RequestContext;
use crate::middleware::{BoxFuture, Middleware, Next};

/// Process-wide request counts keyed by endpoint ID.
///
/// Increments are atomic per key: concurrent requests to the same endpoint
/// never lose an update and observe strictly increasing counts.
#[derive(Debug, Default)]
pub struct RequestCounter {
    counts: DashMap<String, u64>,
}

impl RequestCounter {
    /// Creates an empty counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the count for `endpoint` and returns the new value.
    pub fn increment(&self, endpoint: &str) -> u64 {
        if let Some(mut count) = self.counts.get_mut(endpoint) {
            *count += 1;
            return *count;
        }
        let mut count = self.counts.entry(endpoint.to_owned()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count for `endpoint`.
    #[must_use]
    pub fn count(&self, endpoint: &str) -> u64 {
        self.counts.get(endpoint).map_or(0, |c| *c)
    }

    /// Number of distinct endpoints seen.
    #[must_use]
    pub fn endpoints(&self) -> usize {
        self.counts.len()
    }
}

/// Tracking metadata attached to the request context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestTrack {
    /// `METHOD:/path` of this request.
    pub endpoint_id: String,
    /// Count for the endpoint including this request.
    pub request_count: u64,
    /// When tracking ran.
    pub timestamp: DateTime<Utc>,
}

/// Counting middleware, registered as `request_track`.
#[derive(Debug, Clone)]
pub struct RequestTrackMiddleware {
    counter: Arc<RequestCounter>,
}

impl RequestTrackMiddleware {
    /// Creates the middleware around a shared counter.
    #[must_use]
    pub fn new(counter: Arc<RequestCounter>) -> Self {
        Self { counter }
    }

    /// The counter this middleware writes to.
    #[must_use]
    pub fn counter(&self) -> &Arc<RequestCounter> {
        &self.counter
    }
}

impl Middleware for RequestTrackMiddleware {
    fn name(&self) -> &'static str {
        "request_track"
    }

    fn process<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let endpoint_id = format!("{}:{}", ctx.method(), ctx.path());
            let request_count = self.counter.increment(&endpoint_id);

            tracing::debug!(
                request_id = %ctx.request_id(),
                endpoint = %endpoint_id,
                request_count,
                "tracking request"
            );

            ctx.set_extension(RequestTrack {
                endpoint_id: endpoint_id.clone(),
                request_count,
                timestamp: Utc::now(),
            });

            let response = next.run(ctx).await;

            tracing::debug!(
                request_id = %ctx.request_id(),
                endpoint = %endpoint_id,
                http.status_code = response.status().as_u16(),
                "tracked request completed"
            );

            response
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Endpoint;
    use bytes::Bytes;
    use waypoint_core::response;

    /// Echoes the attached tracking metadata.
    struct EchoTrack;

    impl Endpoint for EchoTrack {
        fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Response> {
            Box::pin(async move { response::ok(&ctx.extension::<RequestTrack>()) })
        }
    }

    fn ctx(method: http::Method, path: &str) -> RequestContext {
        RequestContext::new(
            http::Request::builder()
                .method(method)
                .uri(path)
                .body(Bytes::new())
                .unwrap(),
        )
    }

    #[test]
    fn test_counter_increments_per_endpoint() {
        let counter = RequestCounter::new();
        assert_eq!(counter.increment("GET:/simple"), 1);
        assert_eq!(counter.increment("GET:/simple"), 2);
        assert_eq!(counter.increment("POST:/simple"), 1);
        assert_eq!(counter.count("GET:/simple"), 2);
        assert_eq!(counter.count("GET:/never"), 0);
        assert_eq!(counter.endpoints(), 2);
    }

    #[test]
    fn test_counter_concurrent_increments() {
        let counter = Arc::new(RequestCounter::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = counter.clone();
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        counter.increment("GET:/simple/7");
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(counter.count("GET:/simple/7"), 4000);
    }

    #[tokio::test]
    async fn test_attaches_track() {
        let middleware = RequestTrackMiddleware::new(Arc::new(RequestCounter::new()));

        let mut first = ctx(http::Method::GET, "/simple/7");
        middleware.process(&mut first, Next::endpoint(&EchoTrack)).await;
        let mut second = ctx(http::Method::GET, "/simple/7");
        middleware.process(&mut second, Next::endpoint(&EchoTrack)).await;

        let track = second.extension::<RequestTrack>().unwrap();
        assert_eq!(track.endpoint_id, "GET:/simple/7");
        assert_eq!(track.request_count, 2);
        assert_eq!(middleware.counter().count("GET:/simple/7"), 2);
    }

    #[test]
    fn test_track_serializes_camel_case() {
        let track = RequestTrack {
            endpoint_id: "GET:/simple".to_string(),
            request_count: 3,
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&track).unwrap();
        assert_eq!(json["endpointId"], "GET:/simple");
        assert_eq!(json["requestCount"], 3);
        assert!(json["timestamp"].is_string());
    }
}
