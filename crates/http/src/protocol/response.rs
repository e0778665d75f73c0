//! HTTP response head.

use std::fmt;

use bytes::{BufMut, BytesMut};
use http::{StatusCode, Version};
use tracing::error;

use crate::protocol::head::{Head, is_writable_version, parse_version, version_label};
use crate::protocol::{ParseError, SendError};
use crate::utils::put_latin1;

/// Protocol version, status code and optional reason phrase of a response.
///
/// The reason phrase is kept as received; `None` means the status line had
/// none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    version: Version,
    status: StatusCode,
    reason: Option<String>,
}

impl ResponseHead {
    pub fn new(version: Version, status: StatusCode) -> Self {
        Self { version, status, reason: None }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// The received reason phrase, or the canonical one for the status.
    pub fn reason_phrase(&self) -> Option<&str> {
        self.reason.as_deref().or_else(|| self.status.canonical_reason())
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Interim responses precede the final response of the same exchange.
    pub fn is_informational(&self) -> bool {
        self.status.is_informational()
    }
}

impl fmt::Display for ResponseHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", version_label(self.version), self.status.as_str())?;
        if let Some(reason) = &self.reason {
            write!(f, " {reason}")?;
        }
        Ok(())
    }
}

impl Head for ResponseHead {
    fn parse_start_line(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (version, rest) = line
            .split_once([' ', '\t'])
            .ok_or_else(|| ParseError::invalid_start_line(format!("malformed status line {line:?}")))?;

        let rest = rest.trim_start();
        let (status, reason) = match rest.split_once([' ', '\t']) {
            Some((status, reason)) => (status, Some(reason.trim())),
            None => (rest, None),
        };

        let version = parse_version(version)?;
        let status = StatusCode::from_bytes(status.as_bytes()).map_err(|_| ParseError::invalid_status(status))?;
        let reason = reason.filter(|reason| !reason.is_empty()).map(str::to_owned);

        Ok(Self { version, status, reason })
    }

    fn write_start_line(&self, dst: &mut BytesMut) -> Result<(), SendError> {
        if !is_writable_version(self.version) {
            error!(http_version = ?self.version, "unsupported http version");
            return Err(SendError::invalid_head(format!("can't write status line for {:?}", self.version)));
        }

        dst.put_slice(version_label(self.version).as_bytes());
        dst.put_u8(b' ');
        dst.put_slice(self.status.as_str().as_bytes());
        dst.put_u8(b' ');
        if let Some(reason) = &self.reason {
            put_latin1(dst, reason);
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }

    fn version(&self) -> Version {
        self.version
    }

    fn status(&self) -> Option<StatusCode> {
        Some(self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_with_reason() {
        let head = ResponseHead::parse_start_line("HTTP/1.1 404 Not  Found").unwrap();

        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.status(), StatusCode::NOT_FOUND);
        assert_eq!(head.reason(), Some("Not  Found"));
    }

    #[test]
    fn parse_without_reason() {
        let head = ResponseHead::parse_start_line("HTTP/1.0 200").unwrap();

        assert_eq!(head.reason(), None);
        assert_eq!(head.reason_phrase(), Some("OK"));
        assert_eq!(head.to_string(), "HTTP/1.0 200");
    }

    #[test]
    fn reject_bad_status() {
        assert!(matches!(ResponseHead::parse_start_line("HTTP/1.1 2x0 OK"), Err(ParseError::InvalidStatus { .. })));
        assert!(matches!(ResponseHead::parse_start_line("HTTP/1.1"), Err(ParseError::InvalidStartLine { .. })));
        assert!(matches!(ResponseHead::parse_start_line("ICY 200 OK"), Err(ParseError::InvalidVersion { .. })));
    }

    #[test]
    fn status_line_always_has_reason_separator() {
        let mut dst = BytesMut::new();
        ResponseHead::new(Version::HTTP_11, StatusCode::NO_CONTENT).write_start_line(&mut dst).unwrap();
        assert_eq!(&dst[..], b"HTTP/1.1 204 \r\n");

        let mut dst = BytesMut::new();
        ResponseHead::new(Version::HTTP_2, StatusCode::OK).with_reason("Fine").write_start_line(&mut dst).unwrap();
        assert_eq!(&dst[..], b"HTTP/2 200 Fine\r\n");
    }
}
