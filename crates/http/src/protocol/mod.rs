//! Core HTTP data types shared by the codec, the connection loop and applications.
//!
//! # Architecture
//!
//! - **Request** ([`request`]): [`ServerRequest`], the fully decoded request
//!   together with its derived views (body fields, query, cookies, uploads)
//! - **Response** ([`response`]): [`HttpResponse`], the model the codec serializes
//! - **Uploads** ([`upload`]): [`UploadedFile`] descriptors and the
//!   [`UploadStorage`] capability that places uploaded bytes on disk
//! - **Versions** ([`version`]): start-line version tokens
//! - **Errors** ([`error`]): [`HttpError`], [`ParseError`], [`SendError`], [`UploadError`]
//!
//! Every value here is created per frame and never shared across connections.

mod request;
pub use request::FieldMap;
pub use request::ServerParams;
pub use request::ServerRequest;

mod response;
pub use response::HttpResponse;

mod upload;
pub use upload::TempFileStorage;
pub use upload::UploadStatus;
pub use upload::UploadStorage;
pub use upload::UploadedFile;
pub use upload::UPLOAD_FILE_PREFIX;

mod version;
pub use version::parse_version;
pub use version::version_str;
pub use version::DEFAULT_VERSION;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::UploadError;
