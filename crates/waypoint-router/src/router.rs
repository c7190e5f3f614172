//! High-level router API.

use http::Method;

use crate::method_router::MethodRouter;
use crate::node::{InsertConflict, Node};
use crate::params::Params;
use crate::pattern::Pattern;
use crate::{Lookup, RouteError, RouteMatch};

/// Segment tree router mapping `(method, path)` to values of type `T`.
///
/// # Example
///
/// ```rust
/// use waypoint_router::{Lookup, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.route(Method::GET, "/users/:id", "getUser").unwrap();
/// router.route(Method::DELETE, "/users/:id", "deleteUser").unwrap();
///
/// match router.lookup(&Method::GET, "/users/123") {
///     Lookup::Matched(m) => {
///         assert_eq!(*m.value, "getUser");
///         assert_eq!(m.params.get("id"), Some("123"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
///
/// assert!(matches!(router.lookup(&Method::PUT, "/users/1"), Lookup::MethodNotAllowed(_)));
/// assert!(matches!(router.lookup(&Method::GET, "/posts"), Lookup::NotFound));
/// ```
///
/// # Route Priority
///
/// At each position literal segments are tried first, then a named capture,
/// then a wildcard. A branch that fails deeper down falls back to the next
/// candidate, so `/users/me/profile` and `/users/:id` can coexist and
/// `/users/me` still reaches `/users/:id`.
///
/// # Errors and partial state
///
/// A failed insertion may leave earlier expansions of an optional pattern
/// registered. Route tables are built once at startup and discarded on error.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    routes: Vec<(Method, String)>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self {
            root: Node::root(),
            routes: Vec::new(),
        }
    }
}

impl<T> Router<T> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a request path and method.
    ///
    /// The search backtracks past tables lacking `method`, so `GET /users/me`
    /// and `DELETE /users/:id` both stay reachable for the path `/users/me`.
    /// A 405 lists the union of methods of every table the path reached.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup<'_, T> {
        let segments = split_path(path);
        let mut params = Params::new();
        let mut allowed: Vec<Method> = Vec::new();

        let found = self.root.lookup(&segments, &mut params, &mut |methods| {
            if methods.contains(method) {
                return true;
            }
            for candidate in methods.allowed_methods() {
                if !allowed.contains(&candidate) {
                    allowed.push(candidate);
                }
            }
            false
        });

        match found.and_then(|methods| methods.get_value(method)) {
            Some(value) => Lookup::Matched(RouteMatch { value, params }),
            None if allowed.is_empty() => Lookup::NotFound,
            None => Lookup::MethodNotAllowed(allowed),
        }
    }

    /// Resolves a request, ignoring why a miss happened.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, T>> {
        match self.lookup(method, path) {
            Lookup::Matched(found) => Some(found),
            Lookup::MethodNotAllowed(_) | Lookup::NotFound => None,
        }
    }

    /// Resolves a path regardless of method.
    ///
    /// Trailing and repeated slashes are ignored.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments = split_path(path);
        let mut params = Params::new();
        let methods = self.root.lookup(&segments, &mut params, &mut |_| true)?;
        Some((methods, params))
    }

    /// Registered `(method, pattern)` pairs in registration order.
    ///
    /// Patterns are reported as declared, so `/simple/:id?` appears once.
    #[must_use]
    pub fn routes(&self) -> &[(Method, String)] {
        &self.routes
    }

    /// Number of registered `(method, pattern)` pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<T: Clone> Router<T> {
    /// Registers a method table under `pattern`.
    ///
    /// ```rust
    /// use waypoint_router::{MethodRouter, Router};
    ///
    /// let mut router = Router::new();
    /// router
    ///     .insert("/simple/:id?", MethodRouter::new().get("read").post("write"))
    ///     .unwrap();
    ///
    /// assert!(router.match_path("/simple").is_some());
    /// assert!(router.match_path("/simple/7").is_some());
    /// assert_eq!(router.len(), 2);
    /// ```
    pub fn insert(&mut self, pattern: &str, methods: MethodRouter<T>) -> Result<(), RouteError> {
        let parsed = Pattern::parse(pattern)?;
        let declared = parsed.to_string();

        for concrete in parsed.expand() {
            self.root
                .insert(concrete.segments(), methods.clone())
                .map_err(|conflict| match conflict {
                    InsertConflict::Duplicate(method) => RouteError::Duplicate {
                        method,
                        pattern: concrete.to_string(),
                    },
                    InsertConflict::Capture { existing, new } => RouteError::ConflictingCapture {
                        pattern: declared.clone(),
                        existing,
                        new,
                    },
                })?;
        }

        self.routes.extend(
            methods
                .allowed_methods()
                .into_iter()
                .map(|method| (method, declared.clone())),
        );
        Ok(())
    }

    /// Registers a single method under `pattern`.
    pub fn route(&mut self, method: Method, pattern: &str, value: T) -> Result<(), RouteError> {
        self.insert(pattern, MethodRouter::new().method(method, value))
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Router<&'static str> {
        let mut router = Router::new();
        router.route(Method::GET, "/", "index").unwrap();
        router
            .insert("/simple/:id?", MethodRouter::new().get("simpleGet").post("simplePost"))
            .unwrap();
        router
            .insert(
                "/users/:id",
                MethodRouter::new()
                    .get("getUser")
                    .patch("patchUser")
                    .delete("deleteUser"),
            )
            .unwrap();
        router
    }

    #[test]
    fn test_root_route() {
        let router = sample();
        let found = router.match_route(&Method::GET, "/").unwrap();
        assert_eq!(*found.value, "index");
        assert!(found.params.is_empty());
    }

    #[test]
    fn test_optional_capture_both_forms() {
        let router = sample();

        let without = router.match_route(&Method::POST, "/simple").unwrap();
        assert_eq!(*without.value, "simplePost");
        assert_eq!(without.params.get("id"), None);

        let with = router.match_route(&Method::GET, "/simple/9").unwrap();
        assert_eq!(*with.value, "simpleGet");
        assert_eq!(with.params.get("id"), Some("9"));
    }

    #[test]
    fn test_trailing_and_repeated_slashes() {
        let router = sample();
        assert!(router.match_route(&Method::GET, "/users/1/").is_some());
        assert!(router.match_route(&Method::GET, "//users//1").is_some());
    }

    #[test]
    fn test_exact_segment_count() {
        let router = sample();
        assert!(matches!(router.lookup(&Method::GET, "/users"), Lookup::NotFound));
        assert!(matches!(
            router.lookup(&Method::GET, "/users/1/extra"),
            Lookup::NotFound
        ));
        assert!(matches!(
            router.lookup(&Method::GET, "/simple/1/2"),
            Lookup::NotFound
        ));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let router = sample();
        match router.lookup(&Method::POST, "/users/1") {
            Lookup::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, [Method::GET, Method::PATCH, Method::DELETE]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_method_on_capture_reachable_through_static_sibling() {
        let mut router = Router::new();
        router.route(Method::GET, "/users/me", "me").unwrap();
        router.route(Method::DELETE, "/users/:id", "deleteUser").unwrap();

        let found = router.match_route(&Method::DELETE, "/users/me").unwrap();
        assert_eq!(*found.value, "deleteUser");
        assert_eq!(found.params.get("id"), Some("me"));

        let found = router.match_route(&Method::GET, "/users/me").unwrap();
        assert_eq!(*found.value, "me");
        assert!(found.params.is_empty());

        match router.lookup(&Method::PUT, "/users/me") {
            Lookup::MethodNotAllowed(allowed) => {
                assert_eq!(allowed, [Method::GET, Method::DELETE]);
            }
            other => panic!("expected 405, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let mut router = sample();
        let err = router.route(Method::GET, "/users/:id", "again").unwrap_err();
        assert_eq!(
            err,
            RouteError::Duplicate {
                method: Method::GET,
                pattern: "/users/:id".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_through_optional_expansion() {
        let mut router = sample();
        let err = router.route(Method::GET, "/simple", "plain").unwrap_err();
        assert!(matches!(err, RouteError::Duplicate { .. }));
    }

    #[test]
    fn test_same_path_other_method_is_fine() {
        let mut router = sample();
        router.route(Method::PUT, "/users/:id", "putUser").unwrap();
        assert_eq!(
            *router.match_route(&Method::PUT, "/users/1").unwrap().value,
            "putUser"
        );
    }

    #[test]
    fn test_conflicting_capture_rejected() {
        let mut router = sample();
        let err = router.route(Method::PUT, "/users/:userId", "x").unwrap_err();
        assert!(matches!(err, RouteError::ConflictingCapture { .. }));
    }

    #[test]
    fn test_routes_listing() {
        let router = sample();
        let listed: Vec<String> = router
            .routes()
            .iter()
            .map(|(m, p)| format!("{m} {p}"))
            .collect();
        assert_eq!(
            listed,
            [
                "GET /",
                "GET /simple/:id?",
                "POST /simple/:id?",
                "GET /users/:id",
                "PATCH /users/:id",
                "DELETE /users/:id",
            ]
        );
        assert_eq!(router.len(), 6);
    }
}
