//! Core middleware trait and the continuation type.
//!
//! A middleware receives the [`RequestContext`] and a [`Next`] representing the
//! rest of the chain. It may:
//!
//! - run logic, then call `next.run(ctx)` (pre-phase)
//! - return its own response without calling `next` (short-circuit)
//! - inspect the response returned by `next` (post-phase)
//!
//! # Example
//!
//! ```
//! use waypoint_middleware::{BoxFuture, Middleware, Next, RequestContext};
//! use waypoint_core::Response;
//!
//! struct Timing;
//!
//! impl Middleware for Timing {
//!     fn name(&self) -> &'static str {
//!         "timing"
//!     }
//!
//!     fn process<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             let response = next.run(ctx).await;
//!             tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "done");
//!             response
//!         })
//!     }
//! }
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::FutureExt;
use waypoint_core::{response, DispatchError, HandlerError, Response};

use crate::context::RequestContext;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A shareable middleware.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A named pipeline stage.
///
/// # Invariants
///
/// - `next.run()` is called at most once; `Next` is consumed by value
/// - a middleware that does not call `next` must return its own response
pub trait Middleware: Send + Sync + 'static {
    /// Unique name used for registration, route declarations and logs.
    fn name(&self) -> &'static str;

    /// Processes the request.
    fn process<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>)
        -> BoxFuture<'a, Response>;
}

/// The innermost step of a chain: validation plus the route handler.
pub trait Endpoint: Send + Sync {
    /// Produces the response for a request that passed every middleware.
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Response>;
}

/// The rest of the chain, ending in an [`Endpoint`].
pub struct Next<'a> {
    inner: NextInner<'a>,
}

enum NextInner<'a> {
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    Endpoint(&'a dyn Endpoint),
}

impl<'a> Next<'a> {
    /// Wraps `next` with one more middleware.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates the terminal step.
    pub fn endpoint(endpoint: &'a dyn Endpoint) -> Self {
        Self {
            inner: NextInner::Endpoint(endpoint),
        }
    }

    /// Name of the stage this continuation runs next.
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match &self.inner {
            NextInner::Chain { middleware, .. } => middleware.name(),
            NextInner::Endpoint(_) => "handler",
        }
    }

    /// Runs the rest of the chain.
    ///
    /// A panic anywhere below this point is caught here and turned into a 500
    /// response, so the caller's post-phase still runs.
    pub async fn run(self, ctx: &mut RequestContext) -> Response {
        let stage = self.stage();
        let request_id = ctx.request_id();

        let outcome = AssertUnwindSafe(async move {
            match self.inner {
                NextInner::Chain { middleware, next } => middleware.process(ctx, *next).await,
                NextInner::Endpoint(endpoint) => endpoint.call(ctx).await,
            }
        })
        .catch_unwind()
        .await;

        match outcome {
            Ok(response) => response,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    request_id = %request_id,
                    stage,
                    panic = %message,
                    "pipeline stage panicked"
                );
                response::error(&DispatchError::handler(HandlerError::new(format!(
                    "stage '{stage}' panicked: {message}"
                ))))
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A middleware built from a closure.
///
/// ```
/// use waypoint_middleware::FnMiddleware;
///
/// let header = FnMiddleware::new("powered_by", |ctx, next| {
///     Box::pin(async move {
///         let mut response = next.run(ctx).await;
///         response
///             .headers_mut()
///             .insert("x-powered-by", http::HeaderValue::from_static("waypoint"));
///         response
///     })
/// });
/// # let _ = header;
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, Response>
        + Send
        + Sync
        + 'static,
{
    /// Creates a named middleware from `func`.
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a mut RequestContext, Next<'a>) -> BoxFuture<'a, Response>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process<'a>(&'a self, ctx: &'a mut RequestContext, next: Next<'a>) -> BoxFuture<'a, Response> {
        (self.func)(ctx, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::StatusCode;

    struct Ok200;

    impl Endpoint for Ok200 {
        fn call<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, Response> {
            Box::pin(async { response::ok(&"ok") })
        }
    }

    struct Boom;

    impl Endpoint for Boom {
        fn call<'a>(&'a self, _ctx: &'a mut RequestContext) -> BoxFuture<'a, Response> {
            Box::pin(async {
                let exploded: Option<Response> = None;
                exploded.expect("endpoint exploded")
            })
        }
    }

    struct Visit(&'static str);

    impl Middleware for Visit {
        fn name(&self) -> &'static str {
            self.0
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut RequestContext,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                ctx.set_extension(format!("visited:{}", self.0));
                next.run(ctx).await
            })
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(http::Request::get("/test").body(Bytes::new()).unwrap())
    }

    #[tokio::test]
    async fn test_endpoint_only() {
        let mut ctx = ctx();
        let response = Next::endpoint(&Ok200).run(&mut ctx).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chain_reaches_endpoint() {
        let mw = Visit("first");
        let mut ctx = ctx();
        let next = Next::new(&mw, Next::endpoint(&Ok200));
        assert_eq!(next.stage(), "first");

        let response = next.run(&mut ctx).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            ctx.extension::<String>().map(String::as_str),
            Some("visited:first")
        );
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let mut ctx = ctx();
        let response = Next::endpoint(&Boom).run(&mut ctx).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_fn_middleware_short_circuit() {
        let gate = FnMiddleware::new("gate", |_ctx, _next| {
            Box::pin(async { response::json(StatusCode::FORBIDDEN, &"no") })
        });
        assert_eq!(gate.name(), "gate");

        let mut ctx = ctx();
        let response = Next::new(&gate, Next::endpoint(&Boom)).run(&mut ctx).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42_u8), "non-string panic payload");
    }
}
