//! Frame length detection over a growing request buffer.
//!
//! A frame is one complete request: the header block, the blank line, and
//! `content-length` body bytes for methods that carry a body. The length is
//! derived from header bytes only, so once a prefix yields a length, appending
//! bytes never changes it.

use tracing::trace;

use crate::ensure;
use crate::protocol::ParseError;

/// Maximum bytes buffered while still waiting for the end of the header block.
pub const MAX_HEADER_BYTES: usize = 16 * 1024;

/// Largest `content-length` a frame may declare.
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Methods whose frame ends with the header block.
const BODYLESS_METHODS: [&[u8]; 5] = [b"GET", b"HEAD", b"DELETE", b"OPTIONS", b"TRACE"];

/// Methods that must declare a `content-length`.
const BODY_METHODS: [&[u8]; 3] = [b"POST", b"PUT", b"PATCH"];

/// Offset of the first `\r\n\r\n` in `src`.
pub(crate) fn find_header_end(src: &[u8]) -> Option<usize> {
    src.windows(HEADER_END.len()).position(|window| window == HEADER_END)
}

/// Computes the length of the frame starting at offset 0 of `src`.
///
/// # Returns
///
/// - `Ok(None)`: the header block is incomplete, wait for more bytes
/// - `Ok(Some(len))`: the complete frame is `len` bytes long, which may exceed `src.len()`
/// - `Err(_)`: the input can never become a valid frame, see [`ParseError::is_fatal_framing`]
pub fn check_frame(src: &[u8]) -> Result<Option<usize>, ParseError> {
    let Some(header_end) = find_header_end(src) else {
        ensure!(src.len() < MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
        return Ok(None);
    };

    let head_len = header_end + HEADER_END.len();
    let method = src.iter().position(|b| *b == b' ').map(|space| &src[..space]);

    match method {
        Some(method) if BODYLESS_METHODS.iter().any(|m| *m == method) => return Ok(Some(head_len)),
        Some(method) if BODY_METHODS.iter().any(|m| *m == method) => {}
        Some(method) => return Err(ParseError::unsupported_method(String::from_utf8_lossy(method))),
        None => return Err(ParseError::unsupported_method("")),
    }

    let content_length = find_content_length(&src[..header_end])?;
    ensure!(content_length <= MAX_BODY_BYTES, ParseError::too_large_body(content_length, MAX_BODY_BYTES));

    let frame_length = head_len
        .checked_add(content_length)
        .ok_or_else(|| ParseError::invalid_content_length("frame length overflows usize"))?;
    trace!(head_len, content_length, "sized request frame");
    Ok(Some(frame_length))
}

/// Finds the first `content-length` header line and reads its leading digits.
fn find_content_length(header_block: &[u8]) -> Result<usize, ParseError> {
    const NAME: &[u8] = b"content-length:";

    // the request line is skipped, a header line always follows a CRLF
    let value = header_block
        .split(|b| *b == b'\n')
        .skip(1)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
        .find(|line| line.len() >= NAME.len() && line[..NAME.len()].eq_ignore_ascii_case(NAME))
        .map(|line| &line[NAME.len()..])
        .ok_or_else(|| ParseError::invalid_content_length("missing content-length header"))?;

    let value = value.strip_prefix(b" ").unwrap_or(value);
    let digits = value.iter().take_while(|b| b.is_ascii_digit()).count();
    ensure!(digits > 0, ParseError::invalid_content_length(format!("value {:?} is not numeric", String::from_utf8_lossy(value))));

    // only overflow can fail here
    std::str::from_utf8(&value[..digits])
        .ok()
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| ParseError::invalid_content_length("value overflows usize"))
}
