//! HTTP codec module for encoding and decoding HTTP messages
//!
//! A request is handled as one frame: the header block plus, for `POST`, `PUT`
//! and `PATCH`, exactly `content-length` body bytes. Frames are sized from
//! header bytes alone, then decoded in one step into a
//! [`ServerRequest`](crate::protocol::ServerRequest).
//!
//! # Architecture
//!
//! - Framing: [`check_frame`], the 16 KiB [`MAX_HEADER_BYTES`] and 8 MiB [`MAX_BODY_BYTES`] limits
//! - Facade: [`HttpProtocol`] offers `check`, `decode` and `encode` to anything
//!   implementing [`Connection`]
//! - Request handling:
//!   - [`RequestDecoder`]: a `tokio_util` decoder built on [`HttpProtocol`]
//!   - Header parsing via [`HeaderParser`]
//!   - Body parsing via [`BodyParser`]: urlencoded, JSON and multipart
//! - Response handling:
//!   - [`ResponseEncoder`]: deterministic serialization via [`HeaderEncoder`]
//!   - [`ResponseDecoder`]: the client side, used by tests and tools
//!
//! # Example
//!
//! ```
//! use rush_http::codec::{RequestDecoder, ResponseEncoder};
//! use rush_http::protocol::HttpResponse;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! // Decode incoming request
//! let mut decoder = RequestDecoder::new();
//! let mut request_buffer = BytesMut::from(&b"GET / HTTP/1.1\r\n\r\n"[..]);
//! let request = decoder.decode(&mut request_buffer).unwrap();
//! assert!(request.is_some());
//!
//! // Encode outgoing response
//! let mut encoder = ResponseEncoder::new();
//! let mut response_buffer = BytesMut::new();
//! encoder.encode(HttpResponse::ok().with_body("hi"), &mut response_buffer).unwrap();
//! ```

mod body;
mod frame;
mod header;
mod protocol;
mod request_decoder;
mod response_decoder;
mod response_encoder;

pub use body::{BodyKind, BodyParser, FilePart, ParsedBody};
pub use frame::{check_frame, MAX_BODY_BYTES, MAX_HEADER_BYTES};
pub use header::{HeaderEncoder, HeaderParser};
pub use protocol::{Connection, HttpProtocol};
pub use request_decoder::RequestDecoder;
pub use response_decoder::ResponseDecoder;
pub use response_encoder::ResponseEncoder;
