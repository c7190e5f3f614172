//! Per-route request schema.

use serde_json::{Map, Value};
use waypoint_core::{FieldError, InputSource, ValidationErrors};

use crate::codes;
use crate::shape::{ObjectShape, Shape};

/// Raw request parts handed to [`RequestSchema::validate`].
#[derive(Debug, Clone, Copy)]
pub struct RawInputs<'a> {
    /// Query pairs as a JSON object of strings (arrays for repeated keys).
    pub query: &'a Value,
    /// Path captures as a JSON object of strings.
    pub params: &'a Value,
    /// The raw body bytes.
    pub body: &'a [u8],
}

/// Validated request parts. A slot is `None` when no shape was declared for it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedInputs {
    /// Validated query object.
    pub query: Option<Value>,
    /// Validated path parameters.
    pub params: Option<Value>,
    /// Validated JSON body.
    pub body: Option<Value>,
}

/// Shapes declared for one route method.
///
/// ```rust
/// use serde_json::json;
/// use waypoint_schema::{RawInputs, RequestSchema, Shape};
///
/// let schema = RequestSchema::new()
///     .params(Shape::object().field("id", Shape::string().min_len(1)))
///     .body(Shape::object().field("text", Shape::string()));
///
/// let inputs = RawInputs {
///     query: &json!({}),
///     params: &json!({"id": "7"}),
///     body: br#"{"text":"hi"}"#,
/// };
/// let validated = schema.validate(inputs).unwrap();
/// assert_eq!(validated.body, Some(json!({"text": "hi"})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestSchema {
    query: Option<ObjectShape>,
    params: Option<ObjectShape>,
    body: Option<Shape>,
}

impl RequestSchema {
    /// Creates a schema that declares nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the query string shape.
    #[must_use]
    pub fn query(mut self, shape: ObjectShape) -> Self {
        self.query = Some(shape);
        self
    }

    /// Declares the path parameter shape.
    #[must_use]
    pub fn params(mut self, shape: ObjectShape) -> Self {
        self.params = Some(shape);
        self
    }

    /// Declares the JSON body shape.
    #[must_use]
    pub fn body(mut self, shape: impl Into<Shape>) -> Self {
        self.body = Some(shape.into());
        self
    }

    /// Returns `true` if a body shape is declared.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Validates every declared part, collecting errors across all of them.
    ///
    /// Parts are checked in the order query, params, body. An empty body is
    /// validated as `{}` under an object shape and is a `required` error under
    /// any other shape; unparseable JSON is an `invalid_json` error.
    pub fn validate(&self, raw: RawInputs<'_>) -> Result<ValidatedInputs, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let mut validated = ValidatedInputs::default();

        if let Some(shape) = &self.query {
            match shape.validate(InputSource::Query, raw.query) {
                Ok(value) => validated.query = Some(value),
                Err(e) => errors.merge(e),
            }
        }

        if let Some(shape) = &self.params {
            match shape.validate(InputSource::Params, raw.params) {
                Ok(value) => validated.params = Some(value),
                Err(e) => errors.merge(e),
            }
        }

        if let Some(shape) = &self.body {
            match parse_body(shape, raw.body) {
                Ok(body) => match shape.validate(InputSource::Body, &body) {
                    Ok(value) => validated.body = Some(value),
                    Err(e) => errors.merge(e),
                },
                Err(e) => errors.push(e),
            }
        }

        errors.into_result(validated)
    }
}

/// An empty body reads as `{}` under an object shape, so each missing field
/// is reported by name. Any other shape requires a body.
fn parse_body(shape: &Shape, bytes: &[u8]) -> Result<Value, FieldError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return match shape {
            Shape::Object(_) => Ok(Value::Object(Map::new())),
            _ => Err(FieldError::new(
                InputSource::Body,
                "",
                codes::REQUIRED,
                "Request body is required",
            )),
        };
    }
    serde_json::from_slice(bytes).map_err(|e| {
        FieldError::new(
            InputSource::Body,
            "",
            codes::INVALID_JSON,
            format!("Invalid JSON body: {e}"),
        )
    })
}
