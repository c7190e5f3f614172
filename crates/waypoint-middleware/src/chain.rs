//! Middleware chains.
//!
//! A [`Chain`] is the resolved middleware list for one route method: every
//! global middleware in registration order followed by the route's own
//! middleware in declaration order. Running it nests the stages so that
//! pre-phases execute outward-in and post-phases inward-out:
//!
//! ```text
//! global A ─▶ global B ─▶ route C ─▶ endpoint
//!    ◀─────────◀──────────◀──────────┘
//! ```

use waypoint_core::Response;

use crate::context::RequestContext;
use crate::middleware::{BoxedMiddleware, Endpoint, Next};

/// An ordered, immutable middleware list.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<BoxedMiddleware>,
}

impl Chain {
    /// Creates a chain from stages listed outermost first.
    #[must_use]
    pub fn new(stages: Vec<BoxedMiddleware>) -> Self {
        Self { stages }
    }

    /// Names of the stages, outermost first.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|m| m.name())
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns `true` if the chain has no middleware.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Runs the request through every stage and then `endpoint`.
    pub async fn run(&self, ctx: &mut RequestContext, endpoint: &dyn Endpoint) -> Response {
        self.build(endpoint).run(ctx).await
    }

    /// Builds the continuation back to front.
    fn build<'a>(&'a self, endpoint: &'a dyn Endpoint) -> Next<'a> {
        let mut next = Next::endpoint(endpoint);
        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }
        next
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
