//! Route declarations.
//!
//! A [`RouteDefinition`] groups the method definitions registered under one
//! path pattern. Each [`MethodDefinition`] owns its request schema, the names
//! of its route-level middleware (in execution order) and exactly one handler.
//!
//! ```rust
//! use waypoint_core::{response, HandlerError, Response};
//! use waypoint_middleware::RequestContext;
//! use waypoint_schema::{RequestSchema, Shape};
//! use waypoint_server::{MethodDefinition, RouteDefinition};
//!
//! async fn read(_ctx: RequestContext) -> Result<Response, HandlerError> {
//!     Ok(response::ok(&"read"))
//! }
//!
//! let route = RouteDefinition::new("/simple/:id?").get(
//!     MethodDefinition::new(read)
//!         .schema(RequestSchema::new().query(Shape::object().optional("verbose", Shape::boolean())))
//!         .middleware(["request_track"])
//!         .summary("Read a simple resource"),
//! );
//! assert_eq!(route.pattern(), "/simple/:id?");
//! ```

use std::future::Future;

use http::Method;
use waypoint_core::{HandlerError, Response};
use waypoint_middleware::RequestContext;
use waypoint_schema::RequestSchema;

use crate::handler::{erase, ErasedHandler};

/// Documentation attached to a route method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteDoc {
    /// One-line summary.
    pub summary: Option<String>,
    /// Longer description.
    pub description: Option<String>,
    /// Grouping tags.
    pub tags: Vec<String>,
}

/// One HTTP method of a route.
#[derive(Clone)]
pub struct MethodDefinition {
    pub(crate) schema: RequestSchema,
    pub(crate) middleware: Vec<String>,
    pub(crate) handler: ErasedHandler,
    pub(crate) doc: RouteDoc,
}

impl MethodDefinition {
    /// Creates a method definition with an empty schema and no middleware.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, HandlerError>> + Send + 'static,
    {
        Self::from_erased(erase(handler))
    }

    /// Creates a method definition from an already erased handler.
    #[must_use]
    pub fn from_erased(handler: ErasedHandler) -> Self {
        Self {
            schema: RequestSchema::new(),
            middleware: Vec::new(),
            handler,
            doc: RouteDoc::default(),
        }
    }

    /// Sets the request schema.
    #[must_use]
    pub fn schema(mut self, schema: RequestSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Appends route-level middleware names, run in the given order after
    /// every global middleware.
    #[must_use]
    pub fn middleware<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sets the summary.
    #[must_use]
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.doc.summary = Some(summary.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.doc.description = Some(description.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.doc.tags.push(tag.into());
        self
    }

    /// Route-level middleware names.
    #[must_use]
    pub fn middleware_names(&self) -> &[String] {
        &self.middleware
    }

    /// Documentation metadata.
    #[must_use]
    pub fn doc(&self) -> &RouteDoc {
        &self.doc
    }
}

impl std::fmt::Debug for MethodDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDefinition")
            .field("schema", &self.schema)
            .field("middleware", &self.middleware)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}

/// All methods declared for one path pattern.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    pattern: String,
    methods: Vec<(Method, MethodDefinition)>,
}

impl RouteDefinition {
    /// Starts a route for `pattern`, e.g. `/users/:id`.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            methods: Vec::new(),
        }
    }

    /// Declares `method`. Declaring the same method twice is reported when the
    /// app is built.
    #[must_use]
    pub fn method(mut self, method: Method, definition: MethodDefinition) -> Self {
        self.methods.push((method, definition));
        self
    }

    /// Declares `GET`.
    #[must_use]
    pub fn get(self, definition: MethodDefinition) -> Self {
        self.method(Method::GET, definition)
    }

    /// Declares `POST`.
    #[must_use]
    pub fn post(self, definition: MethodDefinition) -> Self {
        self.method(Method::POST, definition)
    }

    /// Declares `PUT`.
    #[must_use]
    pub fn put(self, definition: MethodDefinition) -> Self {
        self.method(Method::PUT, definition)
    }

    /// Declares `PATCH`.
    #[must_use]
    pub fn patch(self, definition: MethodDefinition) -> Self {
        self.method(Method::PATCH, definition)
    }

    /// Declares `DELETE`.
    #[must_use]
    pub fn delete(self, definition: MethodDefinition) -> Self {
        self.method(Method::DELETE, definition)
    }

    /// The declared pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Declared methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = (&Method, &MethodDefinition)> {
        self.methods.iter().map(|(m, d)| (m, d))
    }

    pub(crate) fn into_parts(self) -> (String, Vec<(Method, MethodDefinition)>) {
        (self.pattern, self.methods)
    }
}
