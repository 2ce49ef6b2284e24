//! HTTP connection handling module
//!
//! [`HttpConnection`] drives one client connection: it decodes frames with a
//! [`RequestDecoder`](crate::codec::RequestDecoder), hands each request to a
//! [`Handler`](crate::handler::Handler) and writes the response back.
//!
//! # Lifecycle
//!
//! - requests are served strictly in order, pipelined bytes wait in the buffer
//! - the connection is kept alive until EOF or a request that wants it closed
//! - a handler error is answered with `500 Internal Server Error`
//! - a framing error is answered with a bare `413` or `400` status line and ends the connection

mod http_connection;

pub use http_connection::HttpConnection;
