//! Routing, middleware chains and a TCP server on top of [`rush_http`].
//!
//! A [`Router`] maps request paths to [`Rule`]s. Each rule carries an ordered
//! list of [`Middleware`]s and a target [`RequestHandler`]; a [`Server`]
//! decodes requests with `rush_http`, routes them and writes the responses back.
//!
//! # Example
//!
//! ```no_run
//! use rush_web::{handler_fn, RequestContext, Router, Server};
//!
//! async fn show_user(ctx: RequestContext) -> String {
//!     format!("user {}", ctx.path_param("id").unwrap_or_default())
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder().route("/user/:id", handler_fn(show_user)).build();
//!
//!     Server::builder()
//!         .router(router)
//!         .address("127.0.0.1:8080")
//!         .build()
//!         .unwrap()
//!         .start()
//!         .await;
//! }
//! ```
//!
//! Handlers return anything implementing [`Responder`]: strings, status
//! tuples, [`Json`], `Option`, `Result` and plain [`HttpResponse`]s.
//!
//! [`HttpResponse`]: rush_http::protocol::HttpResponse

mod handler;
mod middleware;
mod request;
mod responder;
mod server;

pub mod router;

pub use handler::handler_fn;
pub use handler::BoxError;
pub use handler::FnHandler;
pub use handler::RequestHandler;
pub use middleware::Middleware;
pub use middleware::Next;
pub use request::PathParams;
pub use request::RequestContext;
pub use responder::Json;
pub use responder::Responder;
pub use router::RouteResult;
pub use router::Router;
pub use router::RouterBuilder;
pub use router::Rule;
pub use server::Server;
pub use server::ServerBuildError;
pub use server::ServerBuilder;
pub use server::ServerConfig;
