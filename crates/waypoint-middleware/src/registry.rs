//! Named middleware registry.

use std::sync::Arc;

use indexmap::IndexMap;
use waypoint_core::RegistrationError;

use crate::chain::Chain;
use crate::middleware::{BoxedMiddleware, Middleware};

/// Middleware registered once at startup and referenced by name.
///
/// ```
/// use waypoint_middleware::stages::{RequestCounter, RequestLogMiddleware, RequestTrackMiddleware};
/// use waypoint_middleware::MiddlewareRegistry;
/// use std::sync::Arc;
///
/// let mut registry = MiddlewareRegistry::new();
/// registry.register(RequestLogMiddleware::new()).unwrap();
/// registry
///     .register(RequestTrackMiddleware::new(Arc::new(RequestCounter::new())))
///     .unwrap();
///
/// let chain = registry.resolve(&["logger"], &["request_track"], "GET /simple").unwrap();
/// assert_eq!(chain.names().collect::<Vec<_>>(), ["logger", "request_track"]);
/// ```
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    entries: IndexMap<&'static str, BoxedMiddleware>,
}

impl MiddlewareRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a middleware under its [`Middleware::name`].
    pub fn register<M: Middleware>(&mut self, middleware: M) -> Result<(), RegistrationError> {
        self.register_arc(Arc::new(middleware))
    }

    /// Registers an already shared middleware.
    pub fn register_arc(&mut self, middleware: BoxedMiddleware) -> Result<(), RegistrationError> {
        let name = middleware.name();
        if self.entries.contains_key(name) {
            return Err(RegistrationError::DuplicateMiddleware {
                name: name.to_string(),
            });
        }
        self.entries.insert(name, middleware);
        Ok(())
    }

    /// Looks up a middleware by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoxedMiddleware> {
        self.entries.get(name)
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// Builds the chain `global ++ route`, failing on the first unknown name.
    ///
    /// `referenced_by` names the route in the error (`"POST /simple"`).
    pub fn resolve<S: AsRef<str>>(
        &self,
        global: &[S],
        route: &[S],
        referenced_by: &str,
    ) -> Result<Chain, RegistrationError> {
        let lookup = |name: &str, by: &str| {
            self.entries
                .get(name)
                .cloned()
                .ok_or_else(|| RegistrationError::UnknownMiddleware {
                    name: name.to_string(),
                    referenced_by: by.to_string(),
                })
        };

        let mut stages = Vec::with_capacity(global.len() + route.len());
        for name in global {
            stages.push(lookup(name.as_ref(), "global chain")?);
        }
        for name in route {
            stages.push(lookup(name.as_ref(), referenced_by)?);
        }
        Ok(Chain::new(stages))
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}
