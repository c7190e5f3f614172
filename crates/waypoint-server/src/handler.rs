//! Route handlers.
//!
//! A handler is any async function taking the validated [`RequestContext`]
//! snapshot and returning `Result<Response, HandlerError>`. Handlers are type
//! erased once at registration so every route method stores the same type.
//!
//! # Example
//!
//! ```rust
//! use waypoint_core::{response, HandlerError, Response};
//! use waypoint_middleware::RequestContext;
//! use waypoint_server::handler::{erase, ErasedHandler};
//!
//! async fn get_user(ctx: RequestContext) -> Result<Response, HandlerError> {
//!     let id = ctx.param("id").unwrap_or_default().to_string();
//!     Ok(response::ok(&serde_json::json!({ "id": id })))
//! }
//!
//! let handler: ErasedHandler = erase(get_user);
//! # let _ = handler;
//! ```

use std::future::Future;
use std::sync::Arc;

use waypoint_core::{HandlerError, Response};
use waypoint_middleware::{BoxFuture, RequestContext};

/// Boxed handler result.
pub type BoxedHandlerResult = BoxFuture<'static, Result<Response, HandlerError>>;

/// A type-erased handler function.
pub type ErasedHandler = Arc<dyn Fn(RequestContext) -> BoxedHandlerResult + Send + Sync>;

/// Erases an async handler function.
pub fn erase<F, Fut>(handler: F) -> ErasedHandler
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
{
    Arc::new(move |ctx: RequestContext| -> BoxedHandlerResult { Box::pin(handler(ctx)) })
}
