//! HTTP header processing for both directions
//!
//! # Components
//!
//! - [`HeaderParser`]: splits a raw header block into a case-insensitive,
//!   multi-valued `HeaderMap`; request lines are parsed alongside it
//! - [`HeaderEncoder`]: writes a response status line, its headers in a
//!   deterministic order, and the body

mod header_encoder;
mod header_parser;

pub use header_encoder::HeaderEncoder;
pub use header_parser::HeaderParser;
pub(crate) use header_parser::RequestLine;
