use crate::responder::Responder;
use crate::RequestContext;
use async_trait::async_trait;
use rush_http::protocol::HttpResponse;

use std::error::Error;
use std::future::Future;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// The target at the end of a rule's middleware chain.
#[async_trait]
pub trait RequestHandler: Send + Sync {
    async fn invoke(&self, ctx: RequestContext) -> Result<HttpResponse, BoxError>;
}

#[async_trait]
impl<H: RequestHandler + ?Sized> RequestHandler for Box<H> {
    async fn invoke(&self, ctx: RequestContext) -> Result<HttpResponse, BoxError> {
        (**self).invoke(ctx).await
    }
}

/// an async fn holder whose result is turned into a response by [`Responder`]
#[derive(Debug, Clone)]
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(RequestContext) -> Fut,
    Fut: Future,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> RequestHandler for FnHandler<F>
where
    F: Fn(RequestContext) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Responder,
{
    async fn invoke(&self, ctx: RequestContext) -> Result<HttpResponse, BoxError> {
        let responder = (self.f)(ctx).await;
        Ok(responder.response_to())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathParams;
    use http::{Method, StatusCode};
    use rush_http::protocol::ServerRequest;

    fn assert_is_handler<T: RequestHandler>(_handler: &T) {
        // no op
    }

    fn ctx(path: &str) -> RequestContext {
        RequestContext::new(ServerRequest::new(Method::GET, path), PathParams::from_iter([("id", "42")]))
    }

    #[tokio::test]
    async fn fn_is_request_handler() {
        async fn show(ctx: RequestContext) -> String {
            format!("user {}", ctx.path_param("id").unwrap_or("?"))
        }

        let handler = handler_fn(show);
        assert_is_handler(&handler);

        let response = handler.invoke(ctx("/user/42")).await.unwrap();
        assert_eq!(&response.body()[..], b"user 42");
    }

    #[tokio::test]
    async fn closure_with_status_tuple() {
        let handler = handler_fn(|_ctx: RequestContext| async { (StatusCode::NO_CONTENT, ()) });

        let boxed: Box<dyn RequestHandler> = Box::new(handler);
        let response = boxed.invoke(ctx("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.body().is_empty());
    }
}
