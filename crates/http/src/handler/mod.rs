//! The application seam of the connection loop.
//!
//! A [`Handler`] turns one decoded [`ServerRequest`] into one [`HttpResponse`].
//! Plain async functions become handlers through [`make_handler`].

use std::error::Error;
use std::future::Future;

use crate::protocol::{HttpResponse, ServerRequest};

#[trait_variant::make(Handler: Send)]
pub trait LocalHandler {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    async fn call(&self, req: ServerRequest) -> Result<HttpResponse, Self::Error>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: Fn(ServerRequest) -> Fut + Send + Sync,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<HttpResponse, Err>> + Send,
{
    type Error = Err;

    async fn call(&self, req: ServerRequest) -> Result<HttpResponse, Self::Error> {
        (self.f)(req).await
    }
}

pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<HttpResponse, Err>>,
    F: Fn(ServerRequest) -> Ret,
{
    HandlerFn { f }
}
