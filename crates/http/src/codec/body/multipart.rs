//! `multipart/form-data` parsing
//!
//! The body is split on `--boundary` delimiters up to the closing
//! `--boundary--`. Each part is a header block, a blank line and a value whose
//! trailing CRLF belongs to the next delimiter. A part is a file when its
//! `content-disposition` has a `filename` and the part has a `content-type`;
//! every other named part is a plain field. Parts without a `name` are skipped.

use std::collections::HashMap;

use bytes::Bytes;
use http::header;
use tracing::debug;

use super::{FilePart, ParsedBody};
use crate::codec::frame::find_header_end;
use crate::codec::header::HeaderParser;
use crate::protocol::FieldMap;

/// Extracts the `boundary` parameter of a multipart content type.
pub(super) fn boundary(content_type: &str) -> Option<String> {
    if let Ok(mime) = content_type.parse::<mime::Mime>() {
        return mime.get_param(mime::BOUNDARY).map(|b| b.as_str().trim_matches('"').to_string()).filter(|b| !b.is_empty());
    }

    // mime rejects some sloppy headers, look for the parameter by hand
    content_type
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("boundary"))
        .map(|(_, value)| value.trim().trim_matches('"').to_string())
        .filter(|b| !b.is_empty())
}

pub(super) fn parse(body: &Bytes, boundary: &str) -> ParsedBody {
    let delimiter = format!("--{boundary}");
    let mut fields = FieldMap::new();
    let mut files = HashMap::new();

    // the first piece is the preamble before the first delimiter
    for piece in split_by(body, delimiter.as_bytes()).skip(1) {
        if piece.starts_with(b"--") {
            break;
        }

        let part = piece.strip_prefix(b"\r\n").unwrap_or(piece);
        if part.is_empty() {
            continue;
        }

        let Some(header_end) = find_header_end(part) else {
            debug!("skip multipart part without header block");
            continue;
        };

        let headers = HeaderParser::parse(&part[..header_end]);
        let value = &part[header_end + 4..];
        let value = value.strip_suffix(b"\r\n").unwrap_or(value);

        let disposition = headers.get(header::CONTENT_DISPOSITION).map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let Some(name) = disposition.as_deref().and_then(|d| disposition_param(d, "name")) else {
            debug!("skip multipart part without name");
            continue;
        };

        let filename = disposition.as_deref().and_then(|d| disposition_param(d, "filename"));
        let media_type = headers.get(header::CONTENT_TYPE).map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

        match (filename, media_type) {
            (Some(filename), Some(media_type)) => {
                files.insert(name, FilePart { filename, media_type, data: body.slice_ref(value) });
            }
            _ => {
                fields.insert(name, String::from_utf8_lossy(value).into_owned());
            }
        }
    }

    ParsedBody { fields, files }
}

/// Reads parameter `key` of a `content-disposition` value, unquoting it.
///
/// A quoted value runs to its closing quote, so it may contain `;`.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    let mut rest = disposition.split_once(';')?.1;

    loop {
        let (name, after_name) = rest.split_once('=')?;
        // a parameter without `=` before this one is skipped
        let name = name.rsplit(';').next().unwrap_or(name).trim();
        let after_name = after_name.trim_start();

        let (value, tail) = match after_name.strip_prefix('"') {
            Some(quoted) => {
                let end = quoted.find('"')?;
                (&quoted[..end], &quoted[end + 1..])
            }
            None => match after_name.split_once(';') {
                Some((value, tail)) => (value.trim_end(), tail),
                None => (after_name.trim_end(), ""),
            },
        };

        if name.eq_ignore_ascii_case(key) {
            return Some(value.to_string());
        }
        rest = tail;
    }
}

/// Splits `haystack` on every occurrence of `needle`.
fn split_by<'a>(haystack: &'a [u8], needle: &'a [u8]) -> impl Iterator<Item = &'a [u8]> + 'a {
    let mut rest = Some(haystack);
    std::iter::from_fn(move || {
        let current = rest?;
        match current.windows(needle.len()).position(|window| window == needle) {
            Some(pos) => {
                rest = Some(&current[pos + needle.len()..]);
                Some(&current[..pos])
            }
            None => {
                rest = None;
                Some(current)
            }
        }
    })
}
