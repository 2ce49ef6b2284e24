//! Lenient parsing of request lines and header blocks.
//!
//! Framing has already rejected input that can't be a request, so nothing here
//! fails. Header blocks go through `httparse` first; a block it refuses (a
//! space before a colon, a line without one, more than 64 headers) is split line
//! by line instead, skipping every line that isn't `name: value`. A missing
//! request-line token falls back to a default.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, Version};
use httparse::Status;
use tracing::trace;

use crate::protocol::{parse_version, DEFAULT_VERSION};

const MAX_HEADER_NUM: usize = 64;

/// Splits a raw header block into a case-insensitive, multi-valued map.
///
/// Names and values are trimmed, names are lower-cased, and repeated names keep
/// every value in the order they appeared.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderParser;

impl HeaderParser {
    pub fn parse(block: &[u8]) -> HeaderMap {
        Self::parse_strict(block).unwrap_or_else(|| Self::parse_lenient(block))
    }

    fn parse_strict(block: &[u8]) -> Option<HeaderMap> {
        // httparse wants the blank line that ends a header section
        let mut terminated = Vec::with_capacity(block.len() + 4);
        terminated.extend_from_slice(block);
        if !block.is_empty() && !block.ends_with(b"\n") {
            terminated.extend_from_slice(b"\r\n");
        }
        terminated.extend_from_slice(b"\r\n");

        let mut parsed = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let parsed = match httparse::parse_headers(&terminated, &mut parsed) {
            Ok(Status::Complete((_, parsed))) => parsed,
            Ok(Status::Partial) => return None,
            Err(e) => {
                trace!(cause = %e, "header block is not strict http, parse line by line");
                return None;
            }
        };

        let mut headers = HeaderMap::with_capacity(parsed.len());
        for header in parsed {
            append(&mut headers, header.name.as_bytes(), header.value);
        }
        Some(headers)
    }

    fn parse_lenient(block: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();

        for line in block.split(|b| *b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.is_empty() {
                continue;
            }

            let Some(colon) = line.iter().position(|b| *b == b':') else {
                trace!(line = %String::from_utf8_lossy(line), "skip header line without colon");
                continue;
            };

            append(&mut headers, &line[..colon], &line[colon + 1..]);
        }

        headers
    }
}

fn append(headers: &mut HeaderMap, name: &[u8], value: &[u8]) {
    match (HeaderName::from_bytes(name.trim_ascii()), HeaderValue::from_bytes(value.trim_ascii())) {
        (Ok(name), Ok(value)) => {
            headers.append(name, value);
        }
        _ => trace!(name = %String::from_utf8_lossy(name), "skip invalid header line"),
    }
}

/// The three tokens of a request line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct RequestLine {
    pub(crate) method: Method,
    pub(crate) target: String,
    pub(crate) version: Version,
}

impl RequestLine {
    pub(crate) fn parse(line: &[u8]) -> Self {
        let mut tokens = line.splitn(3, |b| *b == b' ');

        let method = tokens.next().and_then(|token| Method::from_bytes(token).ok()).unwrap_or_default();

        let target = match tokens.next() {
            Some(token) if !token.is_empty() => String::from_utf8_lossy(token).into_owned(),
            _ => "/".to_string(),
        };

        let version = tokens
            .next()
            .and_then(|token| token.get(5..))
            .map(|token| String::from_utf8_lossy(token.trim_ascii()).into_owned())
            .filter(|token| !token.is_empty())
            .map_or(DEFAULT_VERSION, |token| {
                parse_version(&token).unwrap_or_else(|| {
                    trace!(version = %token, "unknown http version, fall back to default");
                    DEFAULT_VERSION
                })
            });

        Self { method, target, version }
    }
}
