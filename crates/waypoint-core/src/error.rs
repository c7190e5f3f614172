//! Error types for Waypoint.
//!
//! [`DispatchError`] covers everything that can go wrong while a single request
//! is being dispatched. Each variant maps to one HTTP status and is rendered
//! with the same JSON [`ErrorEnvelope`]. [`RegistrationError`] is separate: it
//! only occurs while the route table is built and is fatal at startup.

use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where a validated value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    /// The URL query string.
    Query,
    /// Captured path parameters.
    Params,
    /// The JSON request body.
    Body,
}

impl InputSource {
    /// Returns the lowercase name used in error details.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Params => "params",
            Self::Body => "body",
        }
    }
}

impl std::fmt::Display for InputSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Which part of the request the field belongs to.
    pub source: InputSource,
    /// Dotted path of the field (`"text"`, `"address.zip"`). Empty for the root value.
    pub field: String,
    /// Human-readable message.
    pub message: String,
    /// Machine-readable code (`required`, `invalid_type`, `too_short`, ...).
    pub code: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(
        source: InputSource,
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            field: field.into(),
            message: message.into(),
            code: code.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}: {}", self.source, self.message)
        } else {
            write!(f, "{}.{}: {}", self.source, self.field, self.message)
        }
    }
}

/// Ordered collection of every field error found in one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(transparent)]
#[error("{} field error(s)", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an error.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Appends every error from `other`, preserving order.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    /// Returns `true` if no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the recorded errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    /// Returns `true` if any error refers to `field`.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(value)` when empty, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<FieldError> for ValidationErrors {
    fn from(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Failure returned by a route handler.
///
/// The message is logged; clients only ever see a generic 500 envelope.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

impl HandlerError {
    /// Creates a handler error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a handler error wrapping an underlying cause.
    pub fn with_source(message: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(source: anyhow::Error) -> Self {
        Self {
            message: source.to_string(),
            source: Some(source),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(source: serde_json::Error) -> Self {
        Self::with_source("failed to serialize response", source)
    }
}

/// Kind of a per-request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// No route matches the request path.
    NotFound,
    /// The path matches but the method is not registered for it.
    MethodNotAllowed,
    /// One or more inputs failed schema validation.
    Validation,
    /// A handler or middleware failed.
    Handler,
    /// The request did not complete in time.
    Timeout,
    /// The request body exceeded the configured size limit.
    PayloadTooLarge,
    /// The request body could not be read from the connection.
    BadRequest,
}

impl ErrorKind {
    /// Returns the HTTP status code for this kind.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation => StatusCode::BAD_REQUEST,
            Self::Handler => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Timeout => StatusCode::GATEWAY_TIMEOUT,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::BadRequest => StatusCode::BAD_REQUEST,
        }
    }

    /// Returns the snake_case name used in the envelope's `kind` field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::MethodNotAllowed => "method_not_allowed",
            Self::Validation => "validation",
            Self::Handler => "handler",
            Self::Timeout => "timeout",
            Self::PayloadTooLarge => "payload_too_large",
            Self::BadRequest => "bad_request",
        }
    }
}

/// Per-request dispatch failure.
///
/// ```
/// use http::StatusCode;
/// use waypoint_core::DispatchError;
///
/// let error = DispatchError::not_found("/missing");
/// assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
/// assert_eq!(error.to_envelope().error, "Not Found");
/// ```
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route matches the request path.
    #[error("No route matches path '{path}'")]
    NotFound {
        /// The requested path.
        path: String,
    },

    /// The path matched but not for this method.
    #[error("Method {method} is not allowed for path '{path}'")]
    MethodNotAllowed {
        /// The requested method.
        method: Method,
        /// The requested path.
        path: String,
        /// Methods registered for the path.
        allowed: Vec<Method>,
    },

    /// Input validation failed; carries every violated field.
    #[error("Request validation failed")]
    Validation {
        /// The collected field errors.
        #[source]
        errors: ValidationErrors,
    },

    /// A handler returned an error or a pipeline stage panicked.
    #[error("Internal server error")]
    Handler {
        /// The underlying failure (logged, never exposed).
        #[source]
        source: HandlerError,
    },

    /// The request exceeded the configured timeout.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout {
        /// The timeout that was exceeded.
        timeout_ms: u64,
    },

    /// The request body was larger than the server accepts.
    #[error("Request body exceeds the limit of {limit} bytes")]
    PayloadTooLarge {
        /// The configured limit in bytes.
        limit: usize,
    },

    /// The request body could not be read.
    #[error("Failed to read request body")]
    BodyRead {
        /// Transport error text (logged, never exposed).
        reason: String,
    },
}

impl DispatchError {
    /// Creates a not found error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Creates a method not allowed error.
    pub fn method_not_allowed(method: Method, path: impl Into<String>, allowed: Vec<Method>) -> Self {
        Self::MethodNotAllowed {
            method,
            path: path.into(),
            allowed,
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation { errors }
    }

    /// Creates a handler error.
    pub fn handler(source: impl Into<HandlerError>) -> Self {
        Self::Handler {
            source: source.into(),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MethodNotAllowed { .. } => ErrorKind::MethodNotAllowed,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Handler { .. } => ErrorKind::Handler,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::PayloadTooLarge { .. } => ErrorKind::PayloadTooLarge,
            Self::BodyRead { .. } => ErrorKind::BadRequest,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    /// Returns the `Allow` header value for 405 responses.
    #[must_use]
    pub fn allow_header(&self) -> Option<String> {
        match self {
            Self::MethodNotAllowed { allowed, .. } => Some(
                allowed
                    .iter()
                    .map(Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        }
    }

    /// Converts this error to its serializable envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let status = self.status_code();
        ErrorEnvelope {
            error: status
                .canonical_reason()
                .unwrap_or("Unknown Error")
                .to_string(),
            message: self.to_string(),
            kind: self.kind(),
            details: match self {
                Self::Validation { errors } => Some(errors.clone()),
                _ => None,
            },
        }
    }
}

impl From<ValidationErrors> for DispatchError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation(errors)
    }
}

impl From<HandlerError> for DispatchError {
    fn from(source: HandlerError) -> Self {
        Self::Handler { source }
    }
}

/// Serializable error body shared by every non-2xx dispatcher response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Canonical HTTP reason phrase (`"Not Found"`).
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Failure kind.
    pub kind: ErrorKind,
    /// Field errors, present for validation failures only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<ValidationErrors>,
}

/// Route table errors. Any of these aborts startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The same (method, path) was declared twice.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute {
        /// The method.
        method: Method,
        /// The normalized pattern.
        path: String,
    },

    /// A path pattern could not be parsed or conflicts with an existing one.
    #[error("invalid route pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A route or the global chain references an unregistered middleware.
    #[error("unknown middleware '{name}' referenced by {referenced_by}")]
    UnknownMiddleware {
        /// The missing middleware name.
        name: String,
        /// The route (`GET /simple`) or `global chain`.
        referenced_by: String,
    },

    /// Two middleware were registered under the same name.
    #[error("middleware '{name}' registered twice")]
    DuplicateMiddleware {
        /// The duplicated name.
        name: String,
    },
}
