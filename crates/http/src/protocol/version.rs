//! Conversions between `http::Version` and the version token of a start line.

use http::Version;

/// Version assumed when the request line carries none.
pub const DEFAULT_VERSION: Version = Version::HTTP_10;

/// Parses the part of a start line after `HTTP/`, e.g. `1.1`.
pub fn parse_version(token: &str) -> Option<Version> {
    match token {
        "0.9" => Some(Version::HTTP_09),
        "1.0" | "1" => Some(Version::HTTP_10),
        "1.1" => Some(Version::HTTP_11),
        "2" | "2.0" => Some(Version::HTTP_2),
        "3" | "3.0" => Some(Version::HTTP_3),
        _ => None,
    }
}

/// The token written after `HTTP/` in a start line.
pub fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_11 => "1.1",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.0",
    }
}
