//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to values for a single path.
///
/// Methods keep their registration order, which is also the order reported by
/// [`allowed_methods`](Self::allowed_methods).
///
/// ```rust
/// use waypoint_router::MethodRouter;
/// use http::Method;
///
/// let router = MethodRouter::new().get("listUsers").post("createUser");
///
/// assert_eq!(router.get_value(&Method::GET), Some(&"listUsers"));
/// assert_eq!(router.get_value(&Method::DELETE), None);
/// assert_eq!(router.allowed_methods(), [Method::GET, Method::POST]);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 4]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the value for GET, replacing any previous one.
    #[must_use]
    pub fn get(self, value: T) -> Self {
        self.method(Method::GET, value)
    }

    /// Sets the value for POST, replacing any previous one.
    #[must_use]
    pub fn post(self, value: T) -> Self {
        self.method(Method::POST, value)
    }

    /// Sets the value for PUT, replacing any previous one.
    #[must_use]
    pub fn put(self, value: T) -> Self {
        self.method(Method::PUT, value)
    }

    /// Sets the value for PATCH, replacing any previous one.
    #[must_use]
    pub fn patch(self, value: T) -> Self {
        self.method(Method::PATCH, value)
    }

    /// Sets the value for DELETE, replacing any previous one.
    #[must_use]
    pub fn delete(self, value: T) -> Self {
        self.method(Method::DELETE, value)
    }

    /// Sets the value for any method, replacing any previous one.
    #[must_use]
    pub fn method(mut self, method: Method, value: T) -> Self {
        if let Some(slot) = self.entries.iter_mut().find(|(m, _)| *m == method) {
            slot.1 = value;
        } else {
            self.entries.push((method, value));
        }
        self
    }

    /// Adds a value for `method`, handing it back if the method is taken.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), T> {
        if self.contains(&method) {
            return Err(value);
        }
        self.entries.push((method, value));
        Ok(())
    }

    /// Moves every entry of `other` into `self`.
    ///
    /// Stops at the first method already present in `self` and returns it;
    /// entries merged before that point stay merged.
    pub fn merge(&mut self, other: MethodRouter<T>) -> Result<(), Method> {
        for (method, value) in other.entries {
            if self.contains(&method) {
                return Err(method);
            }
            self.entries.push((method, value));
        }
        Ok(())
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get_value(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, value)| value)
    }

    /// Returns `true` if `method` is registered.
    #[must_use]
    pub fn contains(&self, method: &Method) -> bool {
        self.entries.iter().any(|(m, _)| m == method)
    }

    /// Methods registered for this path, in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Iterates over `(method, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Method, &T)> {
        self.entries.iter().map(|(m, v)| (m, v))
    }

    /// Returns `true` if no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
