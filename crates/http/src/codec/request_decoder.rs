//! HTTP request decoder module
//!
//! [`RequestDecoder`] plugs [`HttpProtocol`] into `tokio_util`'s framing: the
//! buffer is sized with [`HttpProtocol::frame_length`], and once a whole frame is
//! buffered it is split off and decoded into a [`ServerRequest`]. Any bytes past
//! the frame stay in the buffer for the next call.
//!
//! # Example
//!
//! ```
//! use rush_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from(&b"GET /hello?name=rush HTTP/1.1\r\nHost: localhost\r\n\r\n"[..]);
//!
//! let request = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(request.path(), "/hello");
//! assert_eq!(request.query_params()["name"], "rush");
//! assert!(buffer.is_empty());
//! ```

use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::debug;

use crate::codec::HttpProtocol;
use crate::protocol::{ParseError, ServerParams, ServerRequest};

/// Upper bound of a single reservation for a frame's missing bytes.
const RESERVE_CHUNK: usize = 64 * 1024;

/// A decoder yielding one [`ServerRequest`] per complete frame.
///
/// Framing errors are returned as [`ParseError`]s; the caller decides how to
/// tell the peer, see [`ParseError::close_payload`].
#[derive(Debug, Clone, Default)]
pub struct RequestDecoder {
    protocol: HttpProtocol,
    server_params: ServerParams,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` storing uploads in the system temp dir
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a decoder that copies `server_params` into every request.
    pub fn with_protocol(protocol: HttpProtocol, server_params: ServerParams) -> Self {
        Self { protocol, server_params }
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.server_params
    }
}

impl Decoder for RequestDecoder {
    type Item = ServerRequest;
    type Error = ParseError;

    /// Attempts to decode one HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(request))`: a whole frame was consumed
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the buffered bytes can never form a request
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame_length) = self.protocol.frame_length(src)? else {
            return Ok(None);
        };

        if src.len() < frame_length {
            src.reserve((frame_length - src.len()).min(RESERVE_CHUNK));
            return Ok(None);
        }

        let frame = src.split_to(frame_length).freeze();
        Ok(Some(self.protocol.decode_frame(frame, self.server_params.clone())))
    }

    /// Like [`decode`](Self::decode), but an incomplete trailing frame is dropped
    /// instead of being reported as an error.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(request) => Ok(Some(request)),
            None => {
                if !src.is_empty() {
                    debug!(remaining = src.len(), "drop incomplete request at eof");
                    src.clear();
                }
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Version};
    use indoc::indoc;

    fn crlf(s: &str) -> BytesMut {
        BytesMut::from(s.replace('\n', "\r\n").as_bytes())
    }

    #[test]
    fn from_curl() {
        let mut buffer = crlf(indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##});

        let request = RequestDecoder::new().decode(&mut buffer).unwrap().unwrap();

        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.version(), Version::HTTP_11);
        assert_eq!(request.target(), "/index.html");
        assert_eq!(request.headers().len(), 3);
        assert_eq!(request.header("user-agent").unwrap(), "curl/7.79.1");
        assert!(buffer.is_empty());
    }

    #[test]
    fn oversized_declared_body_is_rejected_before_buffering() {
        let mut buffer = crlf("POST /x HTTP/1.1\nContent-Length: 1152921504606846976\n\n");
        let capacity = buffer.capacity();

        let err = RequestDecoder::new().decode(&mut buffer).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeBody { .. }));
        assert_eq!(buffer.capacity(), capacity);
    }

    #[test]
    fn large_body_is_reserved_in_chunks() {
        let mut buffer = crlf(&format!("POST /upload HTTP/1.1\nContent-Length: {}\n\n", crate::codec::MAX_BODY_BYTES));

        assert!(RequestDecoder::new().decode(&mut buffer).unwrap().is_none());
        assert!(buffer.capacity() < crate::codec::MAX_BODY_BYTES);
    }

    #[test]
    fn waits_for_the_whole_body() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = crlf("POST /echo HTTP/1.1\nContent-Length: 11\n\nhello");

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(buffer.capacity() >= buffer.len() + 6);

        buffer.extend_from_slice(b" world");
        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(&request.body()[..], b"hello world");
        assert!(buffer.is_empty());
    }

    #[test]
    fn pipelined_requests_are_decoded_in_order() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = crlf("GET /first HTTP/1.1\n\nPUT /second HTTP/1.1\nContent-Length: 3\n\nabcGET /thi");

        let first = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(first.path(), "/first");

        let second = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(second.method(), &Method::PUT);
        assert_eq!(&second.body()[..], b"abc");

        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert_eq!(&buffer[..], b"GET /thi");
    }

    #[test]
    fn server_params_are_attached() {
        let params = ServerParams::from([("remote_addr".to_string(), "127.0.0.1:9000".to_string())]);
        let mut decoder = RequestDecoder::with_protocol(HttpProtocol::new(), params);
        let mut buffer = crlf("HEAD / HTTP/1.0\n\n");

        let request = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(request.server_params()["remote_addr"], "127.0.0.1:9000");
        assert_eq!(request.version(), Version::HTTP_10);
    }

    #[test]
    fn incomplete_frame_is_dropped_at_eof() {
        let mut decoder = RequestDecoder::new();
        let mut buffer = crlf("GET /done HTTP/1.1\n\nGET /cut");

        assert_eq!(decoder.decode_eof(&mut buffer).unwrap().unwrap().path(), "/done");
        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn framing_error_is_returned() {
        let mut buffer = crlf("PATCH /users/1 HTTP/1.1\nHost: x\n\n");

        let err = RequestDecoder::new().decode(&mut buffer).unwrap_err();
        assert!(err.is_fatal_framing());
    }
}
