//! A streaming HTTP/1.1 codec
//!
//! This crate turns a growing byte buffer into complete HTTP requests and turns
//! response values back into bytes. It is built for servers that read a
//! connection incrementally: a request is recognized once its header block, and
//! for body-carrying methods its `content-length` bytes, are fully buffered.
//!
//! # Features
//!
//! - Frame detection over partial input with a 16 KiB header limit
//! - Request decoding into headers, query, cookies and parsed body fields
//! - `application/x-www-form-urlencoded`, JSON and `multipart/form-data` bodies
//! - File uploads written to temporary storage, movable afterwards
//! - Deterministic response encoding with a recomputed `content-length`
//! - Keep-alive connections driven by tokio
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio::net::TcpListener;
//! use rush_http::codec::HttpProtocol;
//! use rush_http::connection::HttpConnection;
//! use rush_http::handler::make_handler;
//! use rush_http::protocol::{HttpResponse, ServerParams, ServerRequest};
//!
//! async fn greet(request: ServerRequest) -> Result<HttpResponse, Infallible> {
//!     let name = request.query_params().get("name").map_or("stranger", String::as_str);
//!     Ok(HttpResponse::ok().with_body(format!("hi {name}, you came from {}\r\n", request.server_params()["remote_addr"])))
//! }
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!     let greet = Arc::new(make_handler(greet));
//!
//!     loop {
//!         let (stream, remote_addr) = listener.accept().await?;
//!         let greet = Arc::clone(&greet);
//!
//!         let server_params = ServerParams::from([("remote_addr".to_string(), remote_addr.to_string())]);
//!         let (reader, writer) = stream.into_split();
//!         let connection = HttpConnection::with_protocol(reader, writer, HttpProtocol::new(), server_params);
//!
//!         tokio::spawn(async move {
//!             if let Err(e) = connection.process(greet).await {
//!                 tracing::warn!(cause = %e, %remote_addr, "connection closed with error");
//!             }
//!         });
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! Modules:
//!
//! - [`protocol`]: request, response and upload types, plus errors
//! - [`codec`]: framing, request decoding and response encoding
//! - [`connection`]: the keep-alive loop over an async reader and writer
//! - [`handler`]: the application seam of the connection loop
//!
//! ## Error Handling
//!
//! - [`protocol::HttpError`]: what a connection loop ends with
//! - [`protocol::ParseError`]: framing and request parsing
//! - [`protocol::SendError`]: writing responses
//! - [`protocol::UploadError`]: Errors of uploaded file operations
//!
//! # Limitations
//!
//! - `GET`, `HEAD`, `DELETE`, `OPTIONS` and `TRACE` never carry a body
//! - `POST`, `PUT` and `PATCH` require `content-length`, chunked bodies are rejected
//! - Maximum header size: 16 KiB

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
