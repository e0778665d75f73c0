//! The start line half of a message.
//!
//! A message is generic over its head, so requests and responses never mix:
//! a decoder, encoder or stream map is built for exactly one [`Head`] type.

use std::fmt;

use bytes::BytesMut;
use http::{Method, StatusCode, Version};

use crate::protocol::{ParseError, SendError};

/// Start line behaviour shared by [`RequestHead`](crate::protocol::RequestHead)
/// and [`ResponseHead`](crate::protocol::ResponseHead).
pub trait Head: fmt::Debug + fmt::Display + Clone + Send + Sync + 'static {
    /// Parses a start line with its line terminator already removed.
    fn parse_start_line(line: &str) -> Result<Self, ParseError>;

    /// Writes the start line, including the trailing CRLF.
    fn write_start_line(&self, dst: &mut BytesMut) -> Result<(), SendError>;

    fn version(&self) -> Version;

    /// The request method, `None` for responses.
    fn method(&self) -> Option<&Method> {
        None
    }

    /// The response status, `None` for requests.
    fn status(&self) -> Option<StatusCode> {
        None
    }
}

/// Parses a protocol label, accepting any ASCII case.
pub(crate) fn parse_version(label: &str) -> Result<Version, ParseError> {
    let version = if label.eq_ignore_ascii_case("HTTP/1.1") {
        Version::HTTP_11
    } else if label.eq_ignore_ascii_case("HTTP/1.0") {
        Version::HTTP_10
    } else if label.eq_ignore_ascii_case("HTTP/2") || label.eq_ignore_ascii_case("HTTP/2.0") {
        Version::HTTP_2
    } else {
        return Err(ParseError::invalid_version(label));
    };
    Ok(version)
}

pub(crate) fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        _ => "HTTP/3",
    }
}

/// Versions that can be written on an HTTP/1 style start line.
pub(crate) fn is_writable_version(version: Version) -> bool {
    matches!(version, Version::HTTP_10 | Version::HTTP_11 | Version::HTTP_2)
}
