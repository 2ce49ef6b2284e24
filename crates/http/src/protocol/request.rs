//! The decoded request handed to applications.
//!
//! A [`ServerRequest`] is built fresh for every frame: raw header map, raw body,
//! and every derived view of them (parsed body fields, uploads, query and cookie
//! parameters) are computed once during decoding.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Version};
use serde::de::DeserializeOwned;

use crate::protocol::{ParseError, UploadedFile};

/// Parameters describing the connection a request arrived on, e.g. `remote_addr`.
pub type ServerParams = HashMap<String, String>;

/// Flat string mapping used for body fields, query and cookie parameters.
pub type FieldMap = HashMap<String, String>;

#[derive(Debug)]
pub struct ServerRequest {
    pub(crate) method: Method,
    pub(crate) target: String,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) parsed_body: FieldMap,
    pub(crate) uploaded_files: HashMap<String, UploadedFile>,
    pub(crate) query_params: FieldMap,
    pub(crate) cookie_params: FieldMap,
    pub(crate) server_params: ServerParams,
}

impl ServerRequest {
    /// Creates an HTTP/1.0 request without headers or body.
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            version: Version::HTTP_10,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            parsed_body: FieldMap::new(),
            uploaded_files: HashMap::new(),
            query_params: FieldMap::new(),
            cookie_params: FieldMap::new(),
            server_params: ServerParams::new(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as it appeared in the request line.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// The target without its query string or fragment.
    pub fn path(&self) -> &str {
        let end = self.target.find(['?', '#']).unwrap_or(self.target.len());
        &self.target[..end]
    }

    /// The raw query string, if the target has one.
    pub fn query(&self) -> Option<&str> {
        let (_, rest) = self.target.split_once('?')?;
        Some(rest.split_once('#').map_or(rest, |(query, _)| query))
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// The first value of header `name`.
    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    /// All values of header `name` joined by `,`; empty if absent or not visible ASCII.
    pub fn header_line(&self, name: &str) -> String {
        self.headers.get_all(name).iter().filter_map(|v| v.to_str().ok()).collect::<Vec<_>>().join(",")
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Deserializes the raw body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        serde_json::from_slice(&self.body).map_err(ParseError::invalid_body)
    }

    pub fn parsed_body(&self) -> &FieldMap {
        &self.parsed_body
    }

    pub fn uploaded_files(&self) -> &HashMap<String, UploadedFile> {
        &self.uploaded_files
    }

    pub fn uploaded_files_mut(&mut self) -> &mut HashMap<String, UploadedFile> {
        &mut self.uploaded_files
    }

    /// Takes ownership of the upload sent under field `name`.
    pub fn take_uploaded_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.uploaded_files.remove(name)
    }

    pub fn query_params(&self) -> &FieldMap {
        &self.query_params
    }

    pub fn cookie_params(&self) -> &FieldMap {
        &self.cookie_params
    }

    pub fn server_params(&self) -> &ServerParams {
        &self.server_params
    }

    /// Returns true when the peer asked to close the connection after this exchange.
    pub fn wants_close(&self) -> bool {
        self.has_connection_token(b"close") || (self.version == Version::HTTP_10 && !self.has_connection_token(b"keep-alive"))
    }

    fn has_connection_token(&self, token: &[u8]) -> bool {
        self.headers
            .get_all(http::header::CONNECTION)
            .iter()
            .any(|v| v.as_bytes().split(|b| *b == b',').any(|t| t.trim_ascii().eq_ignore_ascii_case(token)))
    }
}
