//! The application: route table, middleware chains and the dispatcher.
//!
//! [`AppBuilder::build`] resolves every route method into a compiled entry
//! holding its middleware [`Chain`], schema and handler. Any registration
//! problem (duplicate route, malformed pattern, unknown middleware) fails the
//! build, so a running [`App`] never meets one.
//!
//! # Dispatch
//!
//! ```text
//! Matching ──▶ chain pre-phases ──▶ Validating ──▶ Handling
//!    │                                  │              │
//!    ▼                                  ▼              ▼
//! 404 / 405                            400            500 on Err
//!                   chain post-phases ◀──────────────────┘
//! ```
//!
//! Every path through dispatch ends in a concrete response.

use std::sync::Arc;

use http::Method;
use waypoint_core::{response, DispatchError, RegistrationError, Request, Response};
use waypoint_middleware::{
    BoxFuture, BoxedMiddleware, Chain, Endpoint, Middleware, MiddlewareRegistry, RequestContext,
};
use waypoint_router::{Lookup, MethodRouter, RouteError, RouteMatch, Router};
use waypoint_schema::{RawInputs, RequestSchema};

use crate::handler::ErasedHandler;
use crate::route::{RouteDefinition, RouteDoc};

/// A route method ready to serve: chain, schema and handler.
struct CompiledRoute {
    pattern: Arc<str>,
    chain: Chain,
    schema: RequestSchema,
    handler: ErasedHandler,
}

impl Endpoint for CompiledRoute {
    fn call<'a>(&'a self, ctx: &'a mut RequestContext) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            let query = ctx.raw_query();
            let params = ctx.raw_params();
            let validated = self.schema.validate(RawInputs {
                query: &query,
                params: &params,
                body: ctx.body(),
            });

            let validated = match validated {
                Ok(validated) => validated,
                Err(errors) => {
                    tracing::debug!(
                        request_id = %ctx.request_id(),
                        route = %self.pattern,
                        errors = errors.len(),
                        "request validation failed"
                    );
                    return response::error(&DispatchError::validation(errors));
                }
            };
            ctx.set_validated(validated);

            match (self.handler)(ctx.clone()).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::error!(
                        request_id = %ctx.request_id(),
                        route = %self.pattern,
                        error = %err,
                        cause = ?std::error::Error::source(&err),
                        "handler failed"
                    );
                    response::error(&DispatchError::handler(err))
                }
            }
        })
    }
}

/// A registered route method as listed by [`App::routes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    /// The HTTP method.
    pub method: Method,
    /// The full pattern, base path included.
    pub pattern: String,
    /// Documentation metadata.
    pub doc: RouteDoc,
}

impl RouteInfo {
    /// The one-line summary, if documented.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.doc.summary.as_deref()
    }
}

/// Builder for [`App`].
///
/// ```rust
/// use waypoint_core::{response, HandlerError, Response};
/// use waypoint_middleware::{stages::RequestLogMiddleware, RequestContext};
/// use waypoint_server::{App, MethodDefinition, RouteDefinition};
///
/// async fn index(_ctx: RequestContext) -> Result<Response, HandlerError> {
///     Ok(response::ok(&"hello"))
/// }
///
/// let app = App::builder()
///     .middleware(RequestLogMiddleware::new())
///     .global("logger")
///     .route(RouteDefinition::new("/").get(MethodDefinition::new(index)))
///     .build()
///     .unwrap();
/// assert_eq!(app.routes().len(), 1);
/// ```
#[derive(Default)]
pub struct AppBuilder {
    base_path: Option<String>,
    middleware: Vec<BoxedMiddleware>,
    global: Vec<String>,
    routes: Vec<RouteDefinition>,
}

impl AppBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefixes every route pattern with `base_path` (e.g. `/api`).
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Makes a middleware available by name.
    #[must_use]
    pub fn middleware<M: Middleware>(self, middleware: M) -> Self {
        self.middleware_arc(Arc::new(middleware))
    }

    /// Makes an already shared middleware available by name.
    #[must_use]
    pub fn middleware_arc(mut self, middleware: BoxedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Wraps every route with the named middleware. Global middleware runs in
    /// the order it is added, outside all route middleware.
    #[must_use]
    pub fn global(mut self, name: impl Into<String>) -> Self {
        self.global.push(name.into());
        self
    }

    /// Adds a route.
    #[must_use]
    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Resolves every chain and builds the route table.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistrationError`] found.
    pub fn build(self) -> Result<App, RegistrationError> {
        let mut registry = MiddlewareRegistry::new();
        for middleware in self.middleware {
            registry.register_arc(middleware)?;
        }
        // Checked up front so an app without routes still rejects bad names.
        registry.resolve::<String>(&self.global, &[], "global chain")?;

        let mut router = Router::new();
        let mut infos = Vec::new();

        for route in self.routes {
            let (pattern, methods) = route.into_parts();
            let pattern = join_path(self.base_path.as_deref(), &pattern);
            let shared_pattern: Arc<str> = Arc::from(pattern.as_str());

            let mut table = MethodRouter::new();
            for (method, definition) in methods {
                let referenced_by = format!("{method} {pattern}");
                let chain =
                    registry.resolve(&self.global, &definition.middleware, &referenced_by)?;

                infos.push(RouteInfo {
                    method: method.clone(),
                    pattern: pattern.clone(),
                    doc: definition.doc,
                });

                let compiled = Arc::new(CompiledRoute {
                    pattern: Arc::clone(&shared_pattern),
                    chain,
                    schema: definition.schema,
                    handler: definition.handler,
                });
                if table.insert(method.clone(), compiled).is_err() {
                    return Err(RegistrationError::DuplicateRoute {
                        method,
                        path: pattern,
                    });
                }
            }

            router
                .insert(&pattern, table)
                .map_err(registration_error)?;
        }

        Ok(App {
            router,
            routes: infos,
        })
    }
}

impl std::fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppBuilder")
            .field("base_path", &self.base_path)
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("global", &self.global)
            .field("routes", &self.routes.len())
            .finish()
    }
}

fn registration_error(err: RouteError) -> RegistrationError {
    match err {
        RouteError::InvalidPattern { pattern, reason } => {
            RegistrationError::InvalidPattern { pattern, reason }
        }
        RouteError::Duplicate { method, pattern } => RegistrationError::DuplicateRoute {
            method,
            path: pattern,
        },
        RouteError::ConflictingCapture {
            pattern,
            existing,
            new,
        } => RegistrationError::InvalidPattern {
            pattern,
            reason: format!("capture ':{new}' is ambiguous with ':{existing}'"),
        },
    }
}

fn join_path(base: Option<&str>, pattern: &str) -> String {
    match base.map(|b| b.trim_end_matches('/')) {
        Some(base) if !base.is_empty() => {
            if pattern == "/" {
                base.to_string()
            } else {
                format!("{base}{pattern}")
            }
        }
        _ => pattern.to_string(),
    }
}

/// An immutable, shareable application.
pub struct App {
    router: Router<Arc<CompiledRoute>>,
    routes: Vec<RouteInfo>,
}

impl App {
    /// Creates an [`AppBuilder`].
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Registered route methods in declaration order.
    #[must_use]
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Dispatches a buffered request and always produces a response.
    pub async fn dispatch(&self, request: Request) -> Response {
        let mut ctx = RequestContext::new(request);
        let method = ctx.method().clone();

        match self.router.lookup(&method, ctx.path()) {
            Lookup::Matched(RouteMatch { value, params }) => {
                ctx.set_route(Arc::clone(&value.pattern), params);
                value.chain.run(&mut ctx, &**value).await
            }
            Lookup::MethodNotAllowed(allowed) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.method = %method,
                    http.path = %ctx.path(),
                    "method not allowed"
                );
                response::error(&DispatchError::method_not_allowed(
                    method,
                    ctx.path(),
                    allowed,
                ))
            }
            Lookup::NotFound => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    http.method = %method,
                    http.path = %ctx.path(),
                    "no route matched"
                );
                response::error(&DispatchError::not_found(ctx.path()))
            }
        }
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.routes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::MethodDefinition;
    use bytes::Bytes;
    use http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use waypoint_core::HandlerError;
    use waypoint_middleware::stages::RequestLogMiddleware;

    async fn hello(_ctx: RequestContext) -> Result<Response, HandlerError> {
        Ok(response::ok(&json!({"hello": "world"})))
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn get(path: &str) -> Request {
        http::Request::get(path).body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(None, "/users/:id"), "/users/:id");
        assert_eq!(join_path(Some("/api"), "/users/:id"), "/api/users/:id");
        assert_eq!(join_path(Some("/api/"), "/"), "/api");
        assert_eq!(join_path(Some("/"), "/"), "/");
    }

    #[test]
    fn test_unknown_global_middleware() {
        let err = App::builder().global("logger").build().unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::UnknownMiddleware { ref name, ref referenced_by }
                if name == "logger" && referenced_by == "global chain"
        ));
    }

    #[test]
    fn test_unknown_route_middleware() {
        let err = App::builder()
            .route(
                RouteDefinition::new("/simple")
                    .get(MethodDefinition::new(hello).middleware(["request_track"])),
            )
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::UnknownMiddleware {
                name: "request_track".to_string(),
                referenced_by: "GET /simple".to_string(),
            }
        );
    }

    #[test]
    fn test_duplicate_method_in_one_route() {
        let err = App::builder()
            .route(
                RouteDefinition::new("/users/:id")
                    .get(MethodDefinition::new(hello))
                    .get(MethodDefinition::new(hello)),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateRoute { method, .. } if method == Method::GET));
    }

    #[test]
    fn test_duplicate_across_routes() {
        let err = App::builder()
            .route(RouteDefinition::new("/users/:id").get(MethodDefinition::new(hello)))
            .route(RouteDefinition::new("/users/:id/").get(MethodDefinition::new(hello)))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_ambiguous_capture() {
        let err = App::builder()
            .route(RouteDefinition::new("/users/:id").get(MethodDefinition::new(hello)))
            .route(RouteDefinition::new("/users/:name").delete(MethodDefinition::new(hello)))
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidPattern { .. }));
    }

    #[test]
    fn test_duplicate_middleware_name() {
        let err = App::builder()
            .middleware(RequestLogMiddleware::new())
            .middleware(RequestLogMiddleware::new())
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistrationError::DuplicateMiddleware { .. }));
    }

    #[tokio::test]
    async fn test_not_found_and_method_not_allowed() {
        let app = App::builder()
            .route(
                RouteDefinition::new("/users/:id")
                    .get(MethodDefinition::new(hello))
                    .delete(MethodDefinition::new(hello)),
            )
            .build()
            .unwrap();

        let response = app.dispatch(get("/nope")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["kind"], "not_found");

        let request = http::Request::post("/users/1").body(Bytes::new()).unwrap();
        let response = app.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[http::header::ALLOW], "GET, DELETE");
    }

    #[tokio::test]
    async fn test_method_resolves_past_static_sibling() {
        let app = App::builder()
            .route(RouteDefinition::new("/users/me").get(MethodDefinition::new(hello)))
            .route(RouteDefinition::new("/users/:id").delete(MethodDefinition::new(
                |ctx: RequestContext| async move {
                    Ok(response::ok(&json!({ "deleted": ctx.param("id") })))
                },
            )))
            .build()
            .unwrap();

        let request = http::Request::delete("/users/me").body(Bytes::new()).unwrap();
        let response = app.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"deleted": "me"}));

        let request = http::Request::put("/users/me").body(Bytes::new()).unwrap();
        let response = app.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[http::header::ALLOW], "GET, DELETE");
    }

    #[tokio::test]
    async fn test_base_path_prefix() {
        let app = App::builder()
            .base_path("/api")
            .route(RouteDefinition::new("/").get(MethodDefinition::new(hello)))
            .build()
            .unwrap();

        assert_eq!(app.routes()[0].pattern, "/api");
        assert_eq!(app.dispatch(get("/api")).await.status(), StatusCode::OK);
        assert_eq!(app.dispatch(get("/")).await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_error_hides_cause() {
        let app = App::builder()
            .route(RouteDefinition::new("/fail").get(MethodDefinition::new(
                |_ctx: RequestContext| async {
                    Err(HandlerError::new("connection refused to db-01"))
                },
            )))
            .build()
            .unwrap();

        let response = app.dispatch(get("/fail")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Internal Server Error");
        assert!(!body.to_string().contains("db-01"));
    }

    #[tokio::test]
    async fn test_route_pattern_visible_to_handler() {
        let app = App::builder()
            .route(RouteDefinition::new("/users/:id").get(MethodDefinition::new(
                |ctx: RequestContext| async move {
                    Ok(response::ok(&json!({
                        "route": ctx.route(),
                        "id": ctx.param("id"),
                    })))
                },
            )))
            .build()
            .unwrap();

        let body = body_json(app.dispatch(get("/users/42")).await).await;
        assert_eq!(body, json!({"route": "/users/:id", "id": "42"}));
    }

    #[test]
    fn test_routes_listing() {
        let app = App::builder()
            .route(
                RouteDefinition::new("/users/:id")
                    .get(MethodDefinition::new(hello).summary("Get a user"))
                    .delete(MethodDefinition::new(hello)),
            )
            .build()
            .unwrap();

        let listed: Vec<_> = app
            .routes()
            .iter()
            .map(|r| (r.method.as_str(), r.pattern.as_str(), r.summary()))
            .collect();
        assert_eq!(
            listed,
            [
                ("GET", "/users/:id", Some("Get a user")),
                ("DELETE", "/users/:id", None)
            ]
        );
    }
}
