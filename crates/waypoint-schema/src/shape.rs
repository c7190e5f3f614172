//! Shape declarations.
//!
//! Shapes are plain values built with chained constructors:
//!
//! ```rust
//! use waypoint_schema::Shape;
//!
//! let body = Shape::object()
//!     .field("text", Shape::string().min_len(1).message("Message text is required"))
//!     .with_default("priority", Shape::enumeration(["low", "medium", "high"]), "medium");
//! # let _ = body;
//! ```

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

/// A declared value shape.
#[derive(Debug, Clone)]
pub enum Shape {
    /// Accepts any value unchanged.
    Any,
    /// A string with optional refinements.
    String(StringShape),
    /// A number or integer with optional bounds.
    Number(NumberShape),
    /// `true` or `false`.
    Boolean,
    /// An object with declared fields. Undeclared keys are dropped.
    Object(ObjectShape),
    /// A homogeneous array.
    Array(ArrayShape),
}

impl Shape {
    /// Starts a string shape.
    #[must_use]
    pub fn string() -> StringShape {
        StringShape::default()
    }

    /// Starts a string shape restricted to the given values.
    pub fn enumeration<I, S>(values: I) -> StringShape
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        StringShape {
            one_of: Some(values.into_iter().map(Into::into).collect()),
            ..StringShape::default()
        }
    }

    /// Starts a floating point number shape.
    #[must_use]
    pub fn number() -> NumberShape {
        NumberShape::default()
    }

    /// Starts an integer shape.
    #[must_use]
    pub fn integer() -> NumberShape {
        NumberShape {
            integer: true,
            ..NumberShape::default()
        }
    }

    /// A boolean shape.
    #[must_use]
    pub fn boolean() -> Self {
        Self::Boolean
    }

    /// Starts an object shape with no fields.
    #[must_use]
    pub fn object() -> ObjectShape {
        ObjectShape::default()
    }

    /// Starts an array shape.
    pub fn array(items: impl Into<Shape>) -> ArrayShape {
        ArrayShape {
            items: Box::new(items.into()),
            min_items: None,
            max_items: None,
        }
    }
}

/// String refinements.
#[derive(Debug, Clone, Default)]
pub struct StringShape {
    pub(crate) min_len: Option<usize>,
    pub(crate) max_len: Option<usize>,
    pub(crate) email: bool,
    pub(crate) pattern: Option<Regex>,
    pub(crate) one_of: Option<Vec<String>>,
    pub(crate) message: Option<String>,
}

impl StringShape {
    /// Minimum length in characters.
    #[must_use]
    pub fn min_len(mut self, min: usize) -> Self {
        self.min_len = Some(min);
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max_len(mut self, max: usize) -> Self {
        self.max_len = Some(max);
        self
    }

    /// Requires an email address.
    #[must_use]
    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    /// Requires a match against `pattern`.
    #[must_use]
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Replaces the message of every refinement failure on this string.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Numeric bounds.
#[derive(Debug, Clone, Default)]
pub struct NumberShape {
    pub(crate) integer: bool,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
    pub(crate) message: Option<String>,
}

impl NumberShape {
    /// Inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Replaces the message of every bound failure.
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Whether and how a field may be absent.
#[derive(Debug, Clone, PartialEq)]
pub enum Presence {
    /// Absence is an error.
    Required,
    /// Absence is fine; the field is left out of the output.
    Optional,
    /// Absence is fine; the value is filled in.
    Default(Value),
}

/// A declared object field.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) shape: Shape,
    pub(crate) presence: Presence,
}

impl Field {
    /// The field's shape.
    #[must_use]
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// How absence is handled.
    #[must_use]
    pub fn presence(&self) -> &Presence {
        &self.presence
    }
}

/// Object fields in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    pub(crate) fields: IndexMap<String, Field>,
}

impl ObjectShape {
    /// Adds a required field.
    #[must_use]
    pub fn field(self, name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        self.with_presence(name, shape, Presence::Required)
    }

    /// Adds an optional field.
    #[must_use]
    pub fn optional(self, name: impl Into<String>, shape: impl Into<Shape>) -> Self {
        self.with_presence(name, shape, Presence::Optional)
    }

    /// Adds an optional field filled with `default` when absent.
    #[must_use]
    pub fn with_default(
        self,
        name: impl Into<String>,
        shape: impl Into<Shape>,
        default: impl Into<Value>,
    ) -> Self {
        self.with_presence(name, shape, Presence::Default(default.into()))
    }

    fn with_presence(
        mut self,
        name: impl Into<String>,
        shape: impl Into<Shape>,
        presence: Presence,
    ) -> Self {
        self.fields.insert(
            name.into(),
            Field {
                shape: shape.into(),
                presence,
            },
        );
        self
    }

    /// Iterates over `(name, field)` in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }
}

/// Array item shape and length bounds.
#[derive(Debug, Clone)]
pub struct ArrayShape {
    pub(crate) items: Box<Shape>,
    pub(crate) min_items: Option<usize>,
    pub(crate) max_items: Option<usize>,
}

impl ArrayShape {
    /// Minimum number of items.
    #[must_use]
    pub fn min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Maximum number of items.
    #[must_use]
    pub fn max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }
}

impl From<StringShape> for Shape {
    fn from(shape: StringShape) -> Self {
        Self::String(shape)
    }
}

impl From<NumberShape> for Shape {
    fn from(shape: NumberShape) -> Self {
        Self::Number(shape)
    }
}

impl From<ObjectShape> for Shape {
    fn from(shape: ObjectShape) -> Self {
        Self::Object(shape)
    }
}

impl From<ArrayShape> for Shape {
    fn from(shape: ArrayShape) -> Self {
        Self::Array(shape)
    }
}
