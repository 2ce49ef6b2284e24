//! Request handling module that provides access to the decoded request and path parameters.
//!
//! This module contains the core types for working with HTTP requests in the web framework:
//! - `RequestContext`: owns the decoded request together with its path parameters
//! - `PathParams`: values bound by `:name` segments of the matched rule

use http::{HeaderMap, Method, Version};
use rush_http::protocol::ServerRequest;

/// The request as seen by middlewares and handlers.
///
/// The context is passed by value down the middleware chain, so a middleware
/// may change the request before handing it on.
#[derive(Debug)]
pub struct RequestContext {
    request: ServerRequest,
    path_params: PathParams,
}

impl RequestContext {
    pub fn new(request: ServerRequest, path_params: PathParams) -> Self {
        Self { request, path_params }
    }

    /// Returns a reference to the underlying decoded request
    pub fn request(&self) -> &ServerRequest {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut ServerRequest {
        &mut self.request
    }

    /// Returns the HTTP method of the request
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    /// Returns the request path without query string
    pub fn path(&self) -> &str {
        self.request.path()
    }

    pub fn version(&self) -> Version {
        self.request.version()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    /// Returns a reference to the path parameters extracted from the request URL
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Shorthand for `path_params().get(name)`.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    pub fn into_parts(self) -> (ServerRequest, PathParams) {
        (self.request, self.path_params)
    }
}

/// Path parameters bound by a matched rule, in pattern order.
///
/// For the rule `/user/:id/post/:postId` and the path `/user/42/post/7`, `id`
/// is `42` and `postId` is `7`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    params: Vec<(String, String)>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Gets the value of a path parameter by its name
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        let key = key.as_ref();
        self.params.iter().find(|(name, _)| name == key).map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Binds `name` to `value`, a repeated name keeps the later value.
    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.params.push((name, value)),
        }
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut params = PathParams::empty();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}
