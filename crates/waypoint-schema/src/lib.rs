//! # Waypoint Schema
//!
//! Declarative shapes for request validation.
//!
//! A [`Shape`] describes what a value must look like. [`Shape::validate`] is a
//! pure function: it either returns the cleaned value (defaults filled in,
//! unknown keys dropped, query strings coerced) or a
//! [`ValidationErrors`](waypoint_core::ValidationErrors) listing every violated
//! constraint.
//!
//! [`RequestSchema`] groups the shapes for the three request parts a route can
//! declare: query, path params and JSON body.
//!
//! ## Supported constraints
//!
//! | Shape | Refinements |
//! |---|---|
//! | string | `min_len`, `max_len`, `email`, `pattern`, enumeration |
//! | number / integer | `min`, `max` |
//! | boolean | - |
//! | object | required, optional and defaulted fields |
//! | array | item shape, `min_items`, `max_items` |

#![doc(html_root_url = "https://docs.rs/waypoint-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod request;
mod shape;
mod validate;

pub use request::{RawInputs, RequestSchema, ValidatedInputs};
pub use shape::{ArrayShape, Field, NumberShape, ObjectShape, Presence, Shape, StringShape};

/// Machine-readable error codes reported in [`FieldError::code`](waypoint_core::FieldError).
pub mod codes {
    /// A required field is absent.
    pub const REQUIRED: &str = "required";
    /// The value has the wrong JSON type.
    pub const INVALID_TYPE: &str = "invalid_type";
    /// A string is shorter than its minimum length.
    pub const TOO_SHORT: &str = "too_short";
    /// A string is longer than its maximum length.
    pub const TOO_LONG: &str = "too_long";
    /// A string fails its email or pattern check.
    pub const INVALID_FORMAT: &str = "invalid_format";
    /// A string is not one of the allowed values.
    pub const INVALID_ENUM: &str = "invalid_enum";
    /// A number or array is below its lower bound.
    pub const TOO_SMALL: &str = "too_small";
    /// A number or array is above its upper bound.
    pub const TOO_BIG: &str = "too_big";
    /// An integer field received a fractional number.
    pub const NOT_INTEGER: &str = "not_integer";
    /// The request body is not valid JSON.
    pub const INVALID_JSON: &str = "invalid_json";
}
