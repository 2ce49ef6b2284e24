use std::fmt;
use std::sync::Arc;

use rush_http::protocol::HttpResponse;

use crate::handler::{BoxError, RequestHandler};
use crate::middleware::{Middleware, Next};
use crate::{PathParams, RequestContext};

/// A registered pattern with its middleware chain and target.
pub struct Rule {
    pattern: String,
    middlewares: Vec<Arc<dyn Middleware>>,
    target: Box<dyn RequestHandler>,
}

impl Rule {
    pub fn new(pattern: &str, middlewares: Vec<Arc<dyn Middleware>>, target: Box<dyn RequestHandler>) -> Self {
        Self { pattern: normalize(pattern), middlewares, target }
    }

    /// The normalized pattern, e.g. `/user/:id`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn middlewares(&self) -> &[Arc<dyn Middleware>] {
        &self.middlewares
    }

    pub fn target(&self) -> &dyn RequestHandler {
        self.target.as_ref()
    }

    /// Binds every `:name` segment of the pattern to the input segment at the same position.
    pub fn bind<'p>(&self, path_segments: impl IntoIterator<Item = &'p str>) -> PathParams {
        self.pattern
            .split('/')
            .zip(path_segments)
            .filter_map(|(pattern, value)| pattern.strip_prefix(':').map(|name| (name, value)))
            .collect()
    }

    /// Runs the middleware chain, then the target.
    pub async fn dispatch(&self, ctx: RequestContext) -> Result<HttpResponse, BoxError> {
        Next::new(&self.middlewares, self.target.as_ref()).run(ctx).await
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("pattern", &self.pattern).field("middlewares", &self.middlewares.len()).finish_non_exhaustive()
    }
}

/// Removes spaces and collapses runs of `/`; the result always starts with `/`.
pub(crate) fn normalize(pattern: &str) -> String {
    let mut normalized = String::with_capacity(pattern.len() + 1);
    normalized.push('/');

    for c in pattern.chars().filter(|c| *c != ' ') {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }

    normalized
}
