//! The codec as seen by a connection: size a frame, decode it, encode a reply.
//!
//! [`HttpProtocol`] answers the three questions a byte-oriented connection asks
//! about HTTP/1.1:
//!
//! - [`check`](HttpProtocol::check): is a complete request buffered, and how long is it?
//! - [`decode`](HttpProtocol::decode): turn exactly one frame into a [`ServerRequest`]
//! - [`encode`](HttpProtocol::encode): turn an [`HttpResponse`] into bytes
//!
//! The methods hold no per-call state, so one protocol value can be shared by
//! every connection. The only side effect is writing uploaded files through the
//! configured [`UploadStorage`].

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use http::{header, HeaderMap};
use tracing::{trace, warn};

use crate::codec::body::{parse_urlencoded, BodyParser, FilePart};
use crate::codec::frame::{check_frame, find_header_end};
use crate::codec::header::{HeaderEncoder, HeaderParser, RequestLine};
use crate::protocol::{
    FieldMap, HttpResponse, ParseError, SendError, ServerParams, ServerRequest, TempFileStorage, UploadStorage, UploadedFile,
};

/// The connection-side collaborator of [`HttpProtocol`].
#[cfg_attr(test, mockall::automock)]
pub trait Connection {
    /// Parameters describing this connection, copied into every decoded request.
    fn attributes(&self) -> &ServerParams;

    /// Writes `payload` as the last bytes on this connection and closes it.
    fn close(&mut self, payload: Bytes, abrupt: bool);
}

#[derive(Debug, Clone)]
pub struct HttpProtocol {
    storage: Arc<dyn UploadStorage>,
}

impl Default for HttpProtocol {
    fn default() -> Self {
        Self { storage: Arc::new(TempFileStorage::default()) }
    }
}

impl HttpProtocol {
    pub fn new() -> Self {
        Default::default()
    }

    /// Uses `storage` for uploaded files instead of the system temp dir.
    pub fn with_storage(storage: Arc<dyn UploadStorage>) -> Self {
        Self { storage }
    }

    /// Sizes the frame at the start of `buffer` without side effects.
    ///
    /// See [`check_frame`] for the meaning of the result.
    pub fn frame_length(&self, buffer: &[u8]) -> Result<Option<usize>, ParseError> {
        check_frame(buffer)
    }

    /// Returns the length of the complete frame at the start of `buffer`, or `0`
    /// if more bytes are needed.
    ///
    /// When the buffer can never become a valid request, the connection is
    /// closed with a canned `413` or `400` status line and `0` is returned.
    pub fn check<C: Connection + ?Sized>(&self, connection: &mut C, buffer: &[u8]) -> usize {
        match check_frame(buffer) {
            Ok(Some(length)) => length,
            Ok(None) => 0,
            Err(e) => {
                warn!(cause = %e, "malformed request frame, close connection");
                if let Some(payload) = e.close_payload() {
                    connection.close(Bytes::from_static(payload), true);
                }
                0
            }
        }
    }

    /// Decodes exactly one frame, as sized by [`check`](Self::check).
    pub fn decode<C: Connection + ?Sized>(&self, connection: &C, frame: Bytes) -> ServerRequest {
        self.decode_frame(frame, connection.attributes().clone())
    }

    pub fn encode<C: Connection + ?Sized>(&self, _connection: &C, response: &HttpResponse) -> Result<Bytes, SendError> {
        let mut dst = BytesMut::new();
        HeaderEncoder.encode(response, &mut dst)?;
        Ok(dst.freeze())
    }

    /// Decodes one frame on behalf of a connection described by `server_params`.
    pub fn decode_frame(&self, frame: Bytes, server_params: ServerParams) -> ServerRequest {
        let (head, body) = match find_header_end(&frame) {
            Some(end) => (frame.slice(..end), frame.slice(end + 4..)),
            None => (frame.clone(), Bytes::new()),
        };

        let (request_line, header_block) = match head.windows(2).position(|w| w == b"\r\n") {
            Some(end) => (&head[..end], &head[end + 2..]),
            None => (&head[..], &[][..]),
        };

        let RequestLine { method, target, version } = RequestLine::parse(request_line);
        let headers = HeaderParser::parse(header_block);
        trace!(%method, %target, ?version, body_size = body.len(), "decoded request head");

        let content_type = headers.get(header::CONTENT_TYPE).map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned()).unwrap_or_default();
        let parsed = BodyParser::parse(&content_type, &body);

        let query_params = target
            .split_once('?')
            .map(|(_, query)| query.split_once('#').map_or(query, |(query, _)| query))
            .map(|query| parse_urlencoded(query.as_bytes()))
            .unwrap_or_default();
        let cookie_params = parse_cookies(&headers);
        let uploaded_files = self.store_files(parsed.files);

        ServerRequest {
            method,
            target,
            version,
            headers,
            body,
            parsed_body: parsed.fields,
            uploaded_files,
            query_params,
            cookie_params,
            server_params,
        }
    }

    fn store_files(&self, files: HashMap<String, FilePart>) -> HashMap<String, UploadedFile> {
        files
            .into_iter()
            .map(|(name, part)| {
                let size = part.data.len();
                let file = match self.storage.store(&part.data) {
                    Ok(path) => UploadedFile::stored(path, part.filename, part.media_type, size),
                    Err(e) => {
                        warn!(field = %name, cause = %e, "can't write uploaded file");
                        UploadedFile::unwritten(part.filename, part.media_type, size)
                    }
                };
                (name, file)
            })
            .collect()
    }
}

/// Cookie pairs are `; `-separated; every `cookie` header contributes.
fn parse_cookies(headers: &HeaderMap) -> FieldMap {
    let joined = headers
        .get_all(header::COOKIE)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).replace("; ", "&"))
        .collect::<Vec<_>>()
        .join("&");

    parse_urlencoded(joined.as_bytes())
}
