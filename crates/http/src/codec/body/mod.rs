//! Request body parsing
//!
//! Parsing is a pure function from `content-type` and body bytes to a
//! [`ParsedBody`]. Uploaded files come back as [`FilePart`]s, requests to store
//! bytes somewhere; the decoder hands them to an
//! [`UploadStorage`](crate::protocol::UploadStorage).

mod form;
mod multipart;

use std::collections::HashMap;

use bytes::Bytes;
use tracing::debug;

use crate::protocol::FieldMap;

pub(crate) use form::parse_urlencoded;

/// How a body is interpreted, chosen from its `content-type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyKind {
    /// A JSON object whose members become fields.
    Json,
    /// `multipart/form-data`, split into fields and file parts.
    Multipart { boundary: String },
    /// `application/x-www-form-urlencoded`, also the fallback for unknown types.
    UrlEncoded,
    /// Kept as raw bytes only, a multipart body without a usable boundary.
    Raw,
}

impl BodyKind {
    pub fn classify(content_type: &str) -> Self {
        if content_type.contains("json") {
            BodyKind::Json
        } else if content_type.contains("form-data") {
            multipart::boundary(content_type).map_or(BodyKind::Raw, |boundary| BodyKind::Multipart { boundary })
        } else {
            BodyKind::UrlEncoded
        }
    }
}

/// One uploaded file waiting to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub filename: String,
    pub media_type: String,
    pub data: Bytes,
}

/// Structured view of a request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
    pub fields: FieldMap,
    /// File parts keyed by form field name.
    pub files: HashMap<String, FilePart>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BodyParser;

impl BodyParser {
    pub fn parse(content_type: &str, body: &Bytes) -> ParsedBody {
        if body.is_empty() {
            return ParsedBody::default();
        }

        match BodyKind::classify(content_type) {
            BodyKind::Json => ParsedBody { fields: form::parse_json_fields(body), files: HashMap::new() },
            BodyKind::Multipart { boundary } => multipart::parse(body, &boundary),
            BodyKind::UrlEncoded => ParsedBody { fields: parse_urlencoded(body), files: HashMap::new() },
            BodyKind::Raw => {
                debug!(content_type, "body kept raw");
                ParsedBody::default()
            }
        }
    }
}
