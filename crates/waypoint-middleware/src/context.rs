//! Per-request context.
//!
//! A [`RequestContext`] is created for every dispatched request and owned by
//! that dispatch alone. Middleware receives it mutably; handlers receive a
//! snapshot taken once validation has succeeded.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use waypoint_core::{HandlerError, Request, RequestId};
use waypoint_router::Params;
use waypoint_schema::ValidatedInputs;

/// Header used to propagate request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Mutable per-request state shared by middleware and handlers.
///
/// Besides the request itself it carries:
/// - the matched route pattern and captured path params
/// - the validated query, params and body (filled in before the handler runs)
/// - a typed extension store for middleware-to-handler communication
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use waypoint_middleware::RequestContext;
///
/// #[derive(Debug, PartialEq)]
/// struct Tenant(&'static str);
///
/// let request = http::Request::get("/users/7?verbose=1").body(Bytes::new()).unwrap();
/// let mut ctx = RequestContext::new(request);
/// ctx.set_extension(Tenant("acme"));
///
/// assert_eq!(ctx.path(), "/users/7");
/// assert_eq!(ctx.extension::<Tenant>(), Some(&Tenant("acme")));
/// ```
#[derive(Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    route: Option<Arc<str>>,
    params: Params,
    validated: ValidatedInputs,
    started_at: Instant,
    /// Keyed by the stored value's type. Values are shared so snapshots are cheap.
    extensions: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl RequestContext {
    /// Creates a context for a buffered request.
    ///
    /// A valid `x-request-id` header is reused as the request ID; otherwise a
    /// fresh one is generated.
    #[must_use]
    pub fn new(request: Request) -> Self {
        let (parts, body) = request.into_parts();
        let request_id = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(RequestId::parse)
            .unwrap_or_default();

        Self {
            request_id,
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            route: None,
            params: Params::new(),
            validated: ValidatedInputs::default(),
            started_at: Instant::now(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request ID.
    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the request method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the full request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns the declared pattern of the matched route, e.g. `/users/:id`.
    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    /// Returns a raw captured path parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Returns all raw captured path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Records the matched route and its captures.
    pub fn set_route(&mut self, pattern: Arc<str>, params: Params) {
        self.route = Some(pattern);
        self.params = params;
    }

    /// Raw query pairs as a JSON object of strings.
    ///
    /// Repeated keys become arrays in order of appearance. A malformed query
    /// string yields an empty object.
    #[must_use]
    pub fn raw_query(&self) -> Value {
        let pairs: Vec<(String, String)> = self
            .uri
            .query()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        let mut map = Map::new();
        for (key, value) in pairs {
            match map.get_mut(&key) {
                Some(Value::Array(items)) => items.push(Value::String(value)),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, Value::String(value)]);
                }
                None => {
                    map.insert(key, Value::String(value));
                }
            }
        }
        Value::Object(map)
    }

    /// Raw path params as a JSON object of strings.
    #[must_use]
    pub fn raw_params(&self) -> Value {
        Value::Object(
            self.params
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect(),
        )
    }

    /// Stores the validated inputs.
    pub fn set_validated(&mut self, validated: ValidatedInputs) {
        self.validated = validated;
    }

    /// Validated query object, if a query shape was declared.
    #[must_use]
    pub fn query(&self) -> Option<&Value> {
        self.validated.query.as_ref()
    }

    /// Validated path params, if a params shape was declared.
    #[must_use]
    pub fn validated_params(&self) -> Option<&Value> {
        self.validated.params.as_ref()
    }

    /// Validated JSON body, if a body shape was declared.
    #[must_use]
    pub fn json(&self) -> Option<&Value> {
        self.validated.body.as_ref()
    }

    /// Deserializes the validated query into `T`.
    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        deserialize_slot(self.query(), "query")
    }

    /// Deserializes the validated path params into `T`.
    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        deserialize_slot(self.validated_params(), "params")
    }

    /// Deserializes the validated body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        deserialize_slot(self.json(), "body")
    }

    /// When dispatch of this request began.
    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Time elapsed since dispatch began.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Stores a typed extension, replacing any previous value of that type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Returns the extension of type `T`, if one was stored.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Returns `true` if an extension of type `T` is stored.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }

    /// Removes the extension of type `T`, returning whether one was stored.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> bool {
        self.extensions.remove(&TypeId::of::<T>()).is_some()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("route", &self.route)
            .field("params", &self.params)
            .field("extensions", &self.extensions.len())
            .finish_non_exhaustive()
    }
}

fn deserialize_slot<T: DeserializeOwned>(
    slot: Option<&Value>,
    name: &str,
) -> Result<T, HandlerError> {
    let value = slot.cloned().unwrap_or(Value::Null);
    serde_json::from_value(value)
        .map_err(|e| HandlerError::with_source(format!("failed to read validated {name}"), e))
}
