//! The response model serialized by the codec.
//!
//! Unlike `http::Response`, an [`HttpResponse`] keeps its own reason phrase so a
//! handler can answer with a non-canonical one and it survives a round trip.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, StatusCode, Version};

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    version: Version,
    status: StatusCode,
    reason: String,
    headers: HeaderMap,
    body: Bytes,
}

impl HttpResponse {
    /// An empty HTTP/1.1 response carrying the canonical reason for `status`.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: Version::HTTP_11,
            status,
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    pub fn internal_server_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    #[must_use]
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Appends a header value, keeping any earlier values for the same name.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
        self.reason = status.canonical_reason().unwrap_or_default().to_string();
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub(crate) fn from_raw_parts(version: Version, status: StatusCode, reason: String, headers: HeaderMap, body: Bytes) -> Self {
        Self { version, status, reason, headers, body }
    }
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::ok()
    }
}

impl<B: Into<Bytes>> From<http::Response<B>> for HttpResponse {
    fn from(response: http::Response<B>) -> Self {
        let (parts, body) = response.into_parts();
        let reason = parts.status.canonical_reason().unwrap_or_default().to_string();
        Self { version: parts.version, status: parts.status, reason, headers: parts.headers, body: body.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_reason_by_default() {
        let response = HttpResponse::new(StatusCode::NOT_FOUND);
        assert_eq!(response.reason(), "Not Found");
        assert_eq!(response.version(), Version::HTTP_11);

        let response = response.with_reason("Nothing Here");
        assert_eq!(response.reason(), "Nothing Here");
    }

    #[test]
    fn from_http_response() {
        let response = http::Response::builder()
            .status(StatusCode::CREATED)
            .header("x-id", "7")
            .body("done")
            .unwrap();

        let response = HttpResponse::from(response);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.reason(), "Created");
        assert_eq!(response.headers().get("x-id").unwrap(), "7");
        assert_eq!(response.body(), &Bytes::from_static(b"done"));
    }
}
