//! Client-side decoding of responses written by [`ResponseEncoder`](crate::codec::ResponseEncoder).
//!
//! The head is parsed with `httparse`; the body is exactly `content-length`
//! bytes, or empty when the header is missing.

use bytes::{Buf, BytesMut};
use http::header::{HeaderName, HeaderValue};
use http::{header, HeaderMap, StatusCode, Version};
use httparse::Status;
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::codec::frame::{MAX_BODY_BYTES, MAX_HEADER_BYTES};
use crate::ensure;
use crate::protocol::{HttpResponse, ParseError};

const MAX_HEADER_NUM: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseDecoder;

impl ResponseDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

struct ResponseHead {
    version: Version,
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
    head_len: usize,
}

impl Decoder for ResponseDecoder {
    type Item = HttpResponse;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(head) = parse_head(src)? else {
            ensure!(src.len() < MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
            return Ok(None);
        };

        let content_length = match head.headers.get(header::CONTENT_LENGTH) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|value| value.trim().parse::<usize>().ok())
                .ok_or_else(|| ParseError::invalid_content_length(format!("{value:?}")))?,
            None => 0,
        };

        ensure!(content_length <= MAX_BODY_BYTES, ParseError::too_large_body(content_length, MAX_BODY_BYTES));

        let frame_length = head.head_len + content_length;
        if src.len() < frame_length {
            src.reserve(frame_length - src.len());
            return Ok(None);
        }

        src.advance(head.head_len);
        let body = src.split_to(content_length).freeze();
        trace!(status = head.status.as_u16(), body_size = body.len(), "decoded response");

        Ok(Some(HttpResponse::from_raw_parts(head.version, head.status, head.reason, head.headers, body)))
    }
}

fn parse_head(src: &[u8]) -> Result<Option<ResponseHead>, ParseError> {
    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
    let mut response = httparse::Response::new(&mut headers);

    let head_len = match response.parse(src).map_err(ParseError::invalid_header)? {
        Status::Complete(head_len) => head_len,
        Status::Partial => return Ok(None),
    };

    let version = match response.version {
        Some(0) => Version::HTTP_10,
        Some(1) => Version::HTTP_11,
        other => return Err(ParseError::invalid_header(format!("unsupported response version {other:?}"))),
    };

    let status = response
        .code
        .ok_or_else(|| ParseError::invalid_header("missing status code"))
        .and_then(|code| StatusCode::from_u16(code).map_err(ParseError::invalid_header))?;

    let mut header_map = HeaderMap::with_capacity(response.headers.len());
    for h in response.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes()).map_err(ParseError::invalid_header)?;
        let value = HeaderValue::from_bytes(h.value).map_err(ParseError::invalid_header)?;
        header_map.append(name, value);
    }

    Ok(Some(ResponseHead {
        version,
        status,
        reason: response.reason.unwrap_or_default().to_string(),
        headers: header_map,
        head_len,
    }))
}
