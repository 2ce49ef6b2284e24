//! HTTP response serialization
//!
//! Output is deterministic: `content-length` always reflects the real body,
//! headers other than `set-cookie` are written sorted by name with multiple
//! values joined by `;`, and every `set-cookie` value gets its own line after
//! them, in insertion order.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::header;

use crate::protocol::{version_str, HttpResponse, SendError};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Writes a complete response, head and body, into `dst`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl HeaderEncoder {
    pub fn encode(&self, response: &HttpResponse, dst: &mut BytesMut) -> Result<(), SendError> {
        let body = response.body();
        dst.reserve(INIT_HEADER_SIZE + body.len());

        write!(FastWrite(dst), "HTTP/{} {} {}\r\n", version_str(response.version()), response.status().as_u16(), response.reason())?;

        let headers = response.headers();
        let content_length = body.len().to_string();

        let mut names = headers
            .keys()
            .filter(|name| **name != header::CONTENT_LENGTH && **name != header::SET_COOKIE)
            .map(|name| name.as_str())
            .chain(std::iter::once(header::CONTENT_LENGTH.as_str()))
            .collect::<Vec<_>>();
        names.sort_unstable();

        for name in names {
            dst.put_slice(name.as_bytes());
            dst.put_slice(b": ");
            if name == header::CONTENT_LENGTH.as_str() {
                dst.put_slice(content_length.as_bytes());
            } else {
                for (i, value) in headers.get_all(name).iter().enumerate() {
                    if i > 0 {
                        dst.put_u8(b';');
                    }
                    dst.put_slice(value.as_bytes());
                }
            }
            dst.put_slice(b"\r\n");
        }

        for cookie in headers.get_all(header::SET_COOKIE) {
            dst.put_slice(b"set-cookie: ");
            dst.put_slice(cookie.as_bytes());
            dst.put_slice(b"\r\n");
        }

        dst.put_slice(b"\r\n");
        dst.put_slice(body);
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// This is an optimization to avoid unnecessary bounds checking when writing
/// to the bytes buffer, since we've already reserved enough space.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
