use http::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("declared body size {declared_size} exceeds the limit {max_size}")]
    TooLargeBody { declared_size: usize, max_size: usize },

    #[error("unsupported http method: {method:?}")]
    UnsupportedMethod { method: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

const CLOSE_PAYLOAD_TOO_LARGE: &[u8] = b"HTTP/1.1 413 Request Entity Too Large\r\n\r\n";
const CLOSE_BAD_REQUEST: &[u8] = b"HTTP/1.1 400 Bad Request\r\n\r\n";

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_large_body(declared_size: usize, max_size: usize) -> Self {
        Self::TooLargeBody { declared_size, max_size }
    }

    pub fn unsupported_method<S: ToString>(method: S) -> Self {
        Self::UnsupportedMethod { method: method.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    /// Returns true for errors detected while sizing a frame; these end the connection.
    pub fn is_fatal_framing(&self) -> bool {
        matches!(self, Self::TooLargeHeader { .. } | Self::TooLargeBody { .. } | Self::UnsupportedMethod { .. } | Self::InvalidContentLength { .. })
    }

    /// The status the peer is told about before the connection goes away.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::TooLargeHeader { .. } | Self::TooLargeBody { .. } => Some(StatusCode::PAYLOAD_TOO_LARGE),
            Self::UnsupportedMethod { .. } | Self::InvalidContentLength { .. } => Some(StatusCode::BAD_REQUEST),
            _ => None,
        }
    }

    /// The canned status line written to the peer right before closing.
    pub fn close_payload(&self) -> Option<&'static [u8]> {
        match self.status()? {
            StatusCode::PAYLOAD_TOO_LARGE => Some(CLOSE_PAYLOAD_TOO_LARGE),
            _ => Some(CLOSE_BAD_REQUEST),
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Failures of operations on an [`UploadedFile`](crate::protocol::UploadedFile).
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("uploaded file has already been moved")]
    AlreadyMoved,

    #[error("uploaded file was never written to temporary storage")]
    Unavailable,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}
