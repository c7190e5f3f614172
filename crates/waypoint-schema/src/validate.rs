//! Validation against a [`Shape`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Number, Value};
use waypoint_core::{FieldError, InputSource, ValidationErrors};

use crate::codes;
use crate::shape::{ArrayShape, NumberShape, ObjectShape, Presence, Shape, StringShape};

static NULL: Value = Value::Null;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+'-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
            .expect("valid regex")
    })
}

impl Shape {
    /// Validates `raw` and returns the cleaned value.
    ///
    /// Every violated constraint is reported, not just the first. Declared
    /// defaults are filled in, undeclared object keys are dropped, and values
    /// from [`InputSource::Query`] or [`InputSource::Params`] are coerced from
    /// strings to the declared scalar type.
    ///
    /// ```rust
    /// use serde_json::json;
    /// use waypoint_core::InputSource;
    /// use waypoint_schema::Shape;
    ///
    /// let shape = Shape::object().field("id", Shape::integer().min(1.0));
    ///
    /// let ok = shape.validate(InputSource::Params, &json!({"id": "42"})).unwrap();
    /// assert_eq!(ok, json!({"id": 42}));
    ///
    /// let err = shape.validate(InputSource::Params, &json!({"id": "0"})).unwrap_err();
    /// assert!(err.has_field("id"));
    /// ```
    pub fn validate(&self, source: InputSource, raw: &Value) -> Result<Value, ValidationErrors> {
        Run::new(source).finish(|run, path| run.check(self, raw, path))
    }
}

impl ObjectShape {
    /// Validates an object against these fields. See [`Shape::validate`].
    pub fn validate(&self, source: InputSource, raw: &Value) -> Result<Value, ValidationErrors> {
        Run::new(source).finish(|run, path| run.check_object(self, raw, path))
    }
}

struct Run {
    source: InputSource,
    coerce: bool,
    errors: ValidationErrors,
}

impl Run {
    fn new(source: InputSource) -> Self {
        Self {
            source,
            coerce: matches!(source, InputSource::Query | InputSource::Params),
            errors: ValidationErrors::new(),
        }
    }

    fn finish(
        mut self,
        check: impl FnOnce(&mut Self, &mut Vec<String>) -> Option<Value>,
    ) -> Result<Value, ValidationErrors> {
        let value = check(&mut self, &mut Vec::new());
        self.errors.into_result(value.unwrap_or(Value::Null))
    }

    fn fail(&mut self, path: &[String], code: &str, message: impl Into<String>) {
        self.errors
            .push(FieldError::new(self.source, path.join("."), code, message));
    }

    fn invalid_type(&mut self, path: &[String], expected: &str, raw: &Value) {
        self.fail(
            path,
            codes::INVALID_TYPE,
            format!("Expected {expected}, received {}", json_type(raw)),
        );
    }

    fn check(&mut self, shape: &Shape, raw: &Value, path: &mut Vec<String>) -> Option<Value> {
        // Repeated query keys arrive as arrays; scalars take the last occurrence.
        let raw = match (raw, shape) {
            (Value::Array(items), Shape::String(_) | Shape::Number(_) | Shape::Boolean)
                if self.coerce =>
            {
                items.last().unwrap_or(&NULL)
            }
            _ => raw,
        };

        match shape {
            Shape::Any => Some(raw.clone()),
            Shape::String(s) => self.check_string(s, raw, path),
            Shape::Number(n) => self.check_number(n, raw, path),
            Shape::Boolean => self.check_boolean(raw, path),
            Shape::Object(o) => self.check_object(o, raw, path),
            Shape::Array(a) => self.check_array(a, raw, path),
        }
    }

    fn check_string(&mut self, shape: &StringShape, raw: &Value, path: &[String]) -> Option<Value> {
        let Value::String(text) = raw else {
            self.invalid_type(path, "string", raw);
            return None;
        };

        let before = self.errors.len();
        let len = text.chars().count();
        let custom = shape.message.as_deref();

        if let Some(min) = shape.min_len {
            if len < min {
                self.fail(
                    path,
                    codes::TOO_SHORT,
                    custom.map_or_else(
                        || format!("String must contain at least {min} character(s)"),
                        ToString::to_string,
                    ),
                );
            }
        }
        if let Some(max) = shape.max_len {
            if len > max {
                self.fail(
                    path,
                    codes::TOO_LONG,
                    custom.map_or_else(
                        || format!("String must contain at most {max} character(s)"),
                        ToString::to_string,
                    ),
                );
            }
        }
        if shape.email && !email_regex().is_match(text) {
            self.fail(path, codes::INVALID_FORMAT, custom.unwrap_or("Invalid email"));
        }
        if let Some(pattern) = &shape.pattern {
            if !pattern.is_match(text) {
                self.fail(path, codes::INVALID_FORMAT, custom.unwrap_or("Invalid format"));
            }
        }
        if let Some(allowed) = &shape.one_of {
            if !allowed.iter().any(|a| a == text) {
                let expected = allowed
                    .iter()
                    .map(|a| format!("'{a}'"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                self.fail(
                    path,
                    codes::INVALID_ENUM,
                    custom.map_or_else(
                        || format!("Invalid enum value. Expected {expected}, received '{text}'"),
                        ToString::to_string,
                    ),
                );
            }
        }

        (self.errors.len() == before).then(|| raw.clone())
    }

    fn check_number(&mut self, shape: &NumberShape, raw: &Value, path: &[String]) -> Option<Value> {
        let expected = if shape.integer { "integer" } else { "number" };

        let number = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) if self.coerce => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        };
        let Some(number) = number else {
            self.invalid_type(path, expected, raw);
            return None;
        };

        if shape.integer && number.fract() != 0.0 {
            self.fail(path, codes::NOT_INTEGER, "Expected integer, received float");
            return None;
        }
        let integer = if shape.integer {
            let Some(integer) = exact_integer(raw, number) else {
                let (code, message) = if number < 0.0 {
                    (codes::TOO_SMALL, format!("Number must be greater than or equal to {}", i64::MIN))
                } else {
                    (codes::TOO_BIG, format!("Number must be less than or equal to {}", i64::MAX))
                };
                self.fail(path, code, message);
                return None;
            };
            Some(integer)
        } else {
            None
        };

        let before = self.errors.len();
        let custom = shape.message.as_deref();
        if let Some(min) = shape.min {
            if number < min {
                self.fail(
                    path,
                    codes::TOO_SMALL,
                    custom.map_or_else(
                        || format!("Number must be greater than or equal to {min}"),
                        ToString::to_string,
                    ),
                );
            }
        }
        if let Some(max) = shape.max {
            if number > max {
                self.fail(
                    path,
                    codes::TOO_BIG,
                    custom.map_or_else(
                        || format!("Number must be less than or equal to {max}"),
                        ToString::to_string,
                    ),
                );
            }
        }
        if self.errors.len() != before {
            return None;
        }

        match (raw, integer) {
            (Value::Number(_), _) => Some(raw.clone()),
            (_, Some(integer)) => Some(Value::from(integer)),
            _ => Number::from_f64(number).map(Value::Number),
        }
    }

    fn check_boolean(&mut self, raw: &Value, path: &[String]) -> Option<Value> {
        match raw {
            Value::Bool(_) => Some(raw.clone()),
            Value::String(s) if self.coerce => match s.as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => {
                    self.invalid_type(path, "boolean", raw);
                    None
                }
            },
            _ => {
                self.invalid_type(path, "boolean", raw);
                None
            }
        }
    }

    fn check_object(
        &mut self,
        shape: &ObjectShape,
        raw: &Value,
        path: &mut Vec<String>,
    ) -> Option<Value> {
        let Value::Object(input) = raw else {
            self.invalid_type(path, "object", raw);
            return None;
        };

        let before = self.errors.len();
        let mut output = Map::new();

        for (name, field) in &shape.fields {
            path.push(name.clone());
            match (input.get(name), &field.presence) {
                (Some(value), _) => {
                    if let Some(clean) = self.check(&field.shape, value, path) {
                        output.insert(name.clone(), clean);
                    }
                }
                (None, Presence::Required) => {
                    self.fail(path, codes::REQUIRED, "Required");
                }
                (None, Presence::Optional) => {}
                (None, Presence::Default(default)) => {
                    output.insert(name.clone(), default.clone());
                }
            }
            path.pop();
        }

        (self.errors.len() == before).then_some(Value::Object(output))
    }

    fn check_array(
        &mut self,
        shape: &ArrayShape,
        raw: &Value,
        path: &mut Vec<String>,
    ) -> Option<Value> {
        let single;
        let items = match raw {
            Value::Array(items) => items.as_slice(),
            other if self.coerce && !other.is_null() => {
                single = [other.clone()];
                &single[..]
            }
            _ => {
                self.invalid_type(path, "array", raw);
                return None;
            }
        };

        let before = self.errors.len();
        if let Some(min) = shape.min_items {
            if items.len() < min {
                self.fail(
                    path,
                    codes::TOO_SMALL,
                    format!("Array must contain at least {min} element(s)"),
                );
            }
        }
        if let Some(max) = shape.max_items {
            if items.len() > max {
                self.fail(
                    path,
                    codes::TOO_BIG,
                    format!("Array must contain at most {max} element(s)"),
                );
            }
        }

        let mut output = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            path.push(index.to_string());
            if let Some(clean) = self.check(&shape.items, item, path) {
                output.push(clean);
            }
            path.pop();
        }

        (self.errors.len() == before).then_some(Value::Array(output))
    }
}

/// Reads a whole number as `i64`, or `None` when it lies outside that range.
/// Digit strings parse directly so large inputs never pass through `f64`.
#[allow(clippy::cast_possible_truncation)]
fn exact_integer(raw: &Value, number: f64) -> Option<i64> {
    // 2^63, the first f64 past i64::MAX.
    const BOUND: f64 = 9_223_372_036_854_775_808.0;

    let direct = match raw {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    direct.or_else(|| {
        let from_float = matches!(raw, Value::Number(n) if n.is_f64())
            || matches!(raw, Value::String(s) if !is_digits(s.trim()));
        (from_float && (-BOUND..BOUND).contains(&number)).then(|| number as i64)
    })
}

fn is_digits(text: &str) -> bool {
    let digits = text.strip_prefix(['-', '+']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
