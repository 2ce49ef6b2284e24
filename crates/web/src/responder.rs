//! Response handling module that converts handler results into HTTP responses.
//!
//! This module provides the [`Responder`] trait which defines how different types
//! can be converted into an [`HttpResponse`]. It includes implementations for common types
//! like Result, Option, String, etc.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::{Response, StatusCode};
use rush_http::protocol::HttpResponse;
use serde::Serialize;
use std::convert::Infallible;
use tracing::error;

const TEXT_PLAIN_UTF_8: &str = "text/plain; charset=utf-8";
const APPLICATION_JSON: &str = "application/json";

/// A trait for types that can be converted into HTTP responses.
///
/// Types implementing this trait can be returned directly from handler
/// functions, see [`handler_fn`](crate::handler_fn).
pub trait Responder {
    fn response_to(self) -> HttpResponse;
}

impl Responder for HttpResponse {
    fn response_to(self) -> HttpResponse {
        self
    }
}

/// The Ok and Err variants must both implement Responder.
impl<T: Responder, E: Responder> Responder for Result<T, E> {
    fn response_to(self) -> HttpResponse {
        match self {
            Ok(t) => t.response_to(),
            Err(e) => e.response_to(),
        }
    }
}

/// None case returns an empty response.
impl<T: Responder> Responder for Option<T> {
    fn response_to(self) -> HttpResponse {
        match self {
            Some(t) => t.response_to(),
            None => HttpResponse::ok(),
        }
    }
}

impl<B> Responder for Response<B>
where
    B: Into<Bytes>,
{
    fn response_to(self) -> HttpResponse {
        HttpResponse::from(self)
    }
}

/// Implementation for (StatusCode, T) tuple allows setting a status code
/// along with the response content.
impl<T: Responder> Responder for (StatusCode, T) {
    fn response_to(self) -> HttpResponse {
        let (status, responder) = self;
        let mut response = responder.response_to();
        response.set_status(status);
        response
    }
}

impl<T: Responder> Responder for (T, StatusCode) {
    fn response_to(self) -> HttpResponse {
        let (responder, status) = self;
        (status, responder).response_to()
    }
}

impl<T: Responder> Responder for Box<T> {
    fn response_to(self) -> HttpResponse {
        (*self).response_to()
    }
}

impl Responder for () {
    fn response_to(self) -> HttpResponse {
        HttpResponse::ok()
    }
}

impl Responder for &'static str {
    fn response_to(self) -> HttpResponse {
        text(Bytes::from_static(self.as_bytes()))
    }
}

impl Responder for String {
    fn response_to(self) -> HttpResponse {
        text(Bytes::from(self))
    }
}

impl Responder for Infallible {
    fn response_to(self) -> HttpResponse {
        match self {}
    }
}

fn text(body: Bytes) -> HttpResponse {
    HttpResponse::ok().with_header(CONTENT_TYPE, HeaderValue::from_static(TEXT_PLAIN_UTF_8)).with_body(body)
}

/// Serializes `T` as an `application/json` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> Responder for Json<T> {
    fn response_to(self) -> HttpResponse {
        match serde_json::to_vec(&self.0) {
            Ok(body) => HttpResponse::ok()
                .with_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON))
                .with_body(body),
            Err(e) => {
                error!(cause = %e, "serialize json response error");
                HttpResponse::internal_server_error()
            }
        }
    }
}
