//! Route pattern parsing.
//!
//! Patterns are `/`-separated segments. Each segment is one of:
//!
//! | Syntax   | Meaning                                           |
//! |----------|---------------------------------------------------|
//! | `users`  | literal segment                                   |
//! | `:id`    | named capture of exactly one segment              |
//! | `:id?`   | optional capture, only allowed as the last segment |
//! | `*rest`  | wildcard capturing one or more trailing segments  |

use crate::RouteError;

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Literal text that must match exactly.
    Static(String),
    /// Named single-segment capture.
    Param(String),
    /// Named capture of all remaining segments.
    Wildcard(String),
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static(text) => f.write_str(text),
            Self::Param(name) => write!(f, ":{name}"),
            Self::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// A parsed route pattern.
///
/// ```rust
/// use waypoint_router::Pattern;
///
/// let pattern = Pattern::parse("/simple/:id?").unwrap();
/// let concrete: Vec<String> = pattern.expand().iter().map(ToString::to_string).collect();
/// assert_eq!(concrete, ["/simple", "/simple/:id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    segments: Vec<Segment>,
    optional_tail: bool,
}

impl Pattern {
    /// Parses a pattern string.
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let invalid = |reason: &str| RouteError::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("pattern must start with '/'"));
        }

        let parts: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
        let mut segments = Vec::with_capacity(parts.len());
        let mut optional_tail = false;
        let mut names: Vec<&str> = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            let is_last = index + 1 == parts.len();

            let segment = if let Some(name) = part.strip_prefix(':') {
                let (name, optional) = match name.strip_suffix('?') {
                    Some(name) => (name, true),
                    None => (name, false),
                };
                if optional {
                    if !is_last {
                        return Err(invalid("optional capture must be the last segment"));
                    }
                    optional_tail = true;
                }
                check_name(name).map_err(|reason| invalid(reason))?;
                if names.contains(&name) {
                    return Err(invalid("capture name used twice"));
                }
                names.push(name);
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                if !is_last {
                    return Err(invalid("wildcard must be the last segment"));
                }
                check_name(name).map_err(|reason| invalid(reason))?;
                if names.contains(&name) {
                    return Err(invalid("capture name used twice"));
                }
                names.push(name);
                Segment::Wildcard(name.to_string())
            } else {
                if part.contains([':', '*', '?']) {
                    return Err(invalid("':', '*' and '?' may only start or end a capture"));
                }
                Segment::Static((*part).to_string())
            };
            segments.push(segment);
        }

        Ok(Self {
            segments,
            optional_tail,
        })
    }

    /// Returns the parsed segments, including an optional tail capture.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns `true` if the last capture is optional.
    #[must_use]
    pub fn has_optional_tail(&self) -> bool {
        self.optional_tail
    }

    /// Expands into the concrete patterns this one registers.
    ///
    /// An optional tail produces two patterns, shortest first. Every other
    /// pattern expands to itself.
    #[must_use]
    pub fn expand(&self) -> Vec<Pattern> {
        let full = Pattern {
            segments: self.segments.clone(),
            optional_tail: false,
        };
        if self.optional_tail {
            let short = Pattern {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
                optional_tail: false,
            };
            vec![short, full]
        } else {
            vec![full]
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        if self.optional_tail {
            f.write_str("?")?;
        }
        Ok(())
    }
}

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("capture name must not be empty");
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err("capture name may only contain ASCII letters, digits and '_'");
    }
    Ok(())
}
