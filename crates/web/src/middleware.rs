//! Middleware chains run in front of a rule's target.
//!
//! A [`Middleware`] receives the request and a [`Next`] handle for the rest of
//! the chain. It may answer on its own, or call [`Next::run`] and post-process
//! what comes back. Middlewares run in registration order.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use rush_http::protocol::HttpResponse;

use crate::handler::{BoxError, RequestHandler};
use crate::RequestContext;

#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<HttpResponse, BoxError>;
}

/// The remainder of a middleware chain, ending with the target handler.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    middlewares: &'a [Arc<dyn Middleware>],
    target: &'a dyn RequestHandler,
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").field("remaining_middlewares", &self.middlewares.len()).finish_non_exhaustive()
    }
}

impl<'a> Next<'a> {
    pub fn new(middlewares: &'a [Arc<dyn Middleware>], target: &'a dyn RequestHandler) -> Self {
        Self { middlewares, target }
    }

    pub async fn run(self, ctx: RequestContext) -> Result<HttpResponse, BoxError> {
        match self.middlewares.split_first() {
            Some((first, rest)) => first.handle(ctx, Next { middlewares: rest, target: self.target }).await,
            None => self.target.invoke(ctx).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{handler_fn, PathParams};
    use http::header::{HeaderName, HeaderValue};
    use http::{Method, StatusCode};
    use rush_http::protocol::ServerRequest;
    use std::sync::Mutex;

    /// Records its name on the way in and tags the response on the way out.
    struct Trace {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    #[async_trait]
    impl Middleware for Trace {
        async fn handle(&self, ctx: RequestContext, next: Next<'_>) -> Result<HttpResponse, BoxError> {
            self.log.lock().unwrap().push(self.name);
            let response = next.run(ctx).await?;
            Ok(response.with_header(HeaderName::from_static("x-trace"), HeaderValue::from_static(self.name)))
        }
    }

    struct Deny;

    #[async_trait]
    impl Middleware for Deny {
        async fn handle(&self, _ctx: RequestContext, _next: Next<'_>) -> Result<HttpResponse, BoxError> {
            Ok(HttpResponse::new(StatusCode::FORBIDDEN))
        }
    }

    fn ctx() -> RequestContext {
        RequestContext::new(ServerRequest::new(Method::GET, "/"), PathParams::empty())
    }

    #[tokio::test]
    async fn runs_in_order_then_target() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Trace { name: "outer", log: log.clone() }) as Arc<dyn Middleware>,
            Arc::new(Trace { name: "inner", log: log.clone() }) as Arc<dyn Middleware>,
        ];
        let target = handler_fn(|_ctx: RequestContext| async { "target" });

        let response = Next::new(&middlewares, &target).run(ctx()).await.unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
        assert_eq!(&response.body()[..], b"target");
        let tags = response.headers().get_all("x-trace").iter().collect::<Vec<_>>();
        assert_eq!(tags, vec!["inner", "outer"]);
    }

    #[tokio::test]
    async fn middleware_can_short_circuit() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let middlewares: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(Deny) as Arc<dyn Middleware>,
            Arc::new(Trace { name: "never", log: log.clone() }) as Arc<dyn Middleware>,
        ];
        let target = handler_fn(|_ctx: RequestContext| async { "unreachable" });

        let response = Next::new(&middlewares, &target).run(ctx()).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn debug_shows_remaining_chain() {
        let middlewares: Vec<Arc<dyn Middleware>> = vec![Arc::new(Deny) as Arc<dyn Middleware>];
        let target = handler_fn(|_ctx: RequestContext| async {});

        let next = Next::new(&middlewares, &target);
        assert_eq!(format!("{next:?}"), "Next { remaining_middlewares: 1, .. }");
    }

    #[tokio::test]
    async fn empty_chain_calls_target() {
        let target = handler_fn(|ctx: RequestContext| async move { ctx.path().to_string() });

        let response = Next::new(&[], &target).run(ctx()).await.unwrap();
        assert_eq!(&response.body()[..], b"/");
    }
}
