//! Path routing over a segment trie.
//!
//! Rules are registered on a [`RouterBuilder`] and frozen into a [`Router`],
//! which only offers lookups. A pattern segment written as `:name` matches any
//! single path segment and binds it under `name`. At each level a literal
//! segment is preferred over the wildcard, and a lookup that runs into a dead
//! end does not backtrack.
//!
//! ```
//! use rush_web::{handler_fn, RequestContext, Router};
//!
//! let router = Router::builder()
//!     .route("/user/:id", handler_fn(|ctx: RequestContext| async move { ctx.path_param("id").unwrap_or_default().to_string() }))
//!     .route("/user/admin", handler_fn(|_ctx: RequestContext| async { "admin" }))
//!     .build();
//!
//! let result = router.parse("/user/42");
//! assert_eq!(result.rule().unwrap().pattern(), "/user/:id");
//! assert_eq!(result.params().get("id"), Some("42"));
//!
//! assert_eq!(router.parse("/user/admin").rule().unwrap().pattern(), "/user/admin");
//! assert!(router.parse("/user").rule().is_none());
//! ```

mod rule;
mod trie;

pub use rule::Rule;
pub use trie::{RuleTrie, Segment};

use std::sync::Arc;

use tracing::{debug, warn};

use crate::handler::RequestHandler;
use crate::middleware::Middleware;
use crate::PathParams;

/// Main router structure that handles HTTP request routing
#[derive(Debug)]
pub struct Router {
    trie: RuleTrie<Rule>,
}

/// Result of matching a route, the matched rule and its path parameters
#[derive(Debug)]
pub struct RouteResult<'router> {
    rule: Option<&'router Rule>,
    params: PathParams,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Matches `path` against the registered rules.
    ///
    /// `path` is split on `/` as is, without normalization.
    pub fn parse(&self, path: &str) -> RouteResult<'_> {
        let segments = path.split('/').collect::<Vec<_>>();

        match self.trie.get(segments.iter().copied()) {
            Some(rule) => RouteResult { rule: Some(rule), params: rule.bind(segments.iter().copied()) },
            None => {
                debug!(path, "no rule matched");
                RouteResult::not_found()
            }
        }
    }

    /// Number of registered rules
    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }
}

impl<'router> RouteResult<'router> {
    fn not_found() -> Self {
        Self { rule: None, params: PathParams::empty() }
    }

    /// Returns true if no rule matched
    #[inline]
    pub fn is_not_found(&self) -> bool {
        self.rule.is_none()
    }

    pub fn rule(&self) -> Option<&'router Rule> {
        self.rule
    }

    /// Gets the path parameters from the matched route
    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn into_parts(self) -> (Option<&'router Rule>, PathParams) {
        (self.rule, self.params)
    }
}

/// Collects rules; the only way to change routing before it is frozen by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RouterBuilder {
    trie: RuleTrie<Rule>,
}

impl RouterBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Registers `target` behind `middlewares` at `pattern`.
    ///
    /// A later registration with the same normalized pattern, wildcard names
    /// aside, replaces the earlier one.
    pub fn register<H>(mut self, pattern: &str, middlewares: Vec<Arc<dyn Middleware>>, target: H) -> Self
    where
        H: RequestHandler + 'static,
    {
        let rule = Rule::new(pattern, middlewares, Box::new(target));
        let pattern = rule.pattern().to_string();

        if let Some(previous) = self.trie.insert(pattern.split('/').map(Segment::parse), rule) {
            warn!(pattern = %pattern, previous = previous.pattern(), "rule replaced by a later registration");
        }
        self
    }

    /// Registers `target` at `pattern` without middlewares.
    pub fn route<H>(self, pattern: &str, target: H) -> Self
    where
        H: RequestHandler + 'static,
    {
        self.register(pattern, Vec::new(), target)
    }

    /// Freezes the registered rules
    pub fn build(self) -> Router {
        Router { trie: self.trie }
    }
}
