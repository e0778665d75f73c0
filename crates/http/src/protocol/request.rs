//! HTTP request head.
//!
//! The request target is kept exactly as received (origin form, absolute
//! form, authority form for `CONNECT`, or `*`). An intercepting proxy must be
//! able to forward what it saw, so the target is not normalised into a
//! [`Uri`] on the way in.

use std::fmt;

use bytes::{BufMut, BytesMut};
use http::{Method, Uri, Version};
use tracing::error;

use crate::protocol::head::{Head, is_writable_version, parse_version, version_label};
use crate::protocol::{ParseError, SendError};
use crate::utils::put_latin1;

/// Method, request target and protocol version of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    method: Method,
    target: String,
    version: Version,
}

impl RequestHead {
    pub fn new(method: Method, target: impl Into<String>, version: Version) -> Self {
        Self { method, target: target.into(), version }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_target(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Parses the target as a [`Uri`], if it is one.
    pub fn uri(&self) -> Option<Uri> {
        self.target.parse().ok()
    }

    /// Returns true if this request's response never carries a body.
    pub fn expects_empty_response(&self) -> bool {
        self.method == Method::HEAD
    }
}

impl fmt::Display for RequestHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.method, self.target, version_label(self.version))
    }
}

impl Head for RequestHead {
    fn parse_start_line(line: &str) -> Result<Self, ParseError> {
        let mut parts = line.split_ascii_whitespace();
        let (Some(method), Some(target), Some(version), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseError::invalid_start_line(format!("malformed request line {line:?}")));
        };

        let method = Method::from_bytes(method.as_bytes()).map_err(|_| ParseError::invalid_method(method))?;
        let version = parse_version(version)?;

        Ok(Self { method, target: target.to_owned(), version })
    }

    fn write_start_line(&self, dst: &mut BytesMut) -> Result<(), SendError> {
        if !is_writable_version(self.version) {
            error!(http_version = ?self.version, "unsupported http version");
            return Err(SendError::invalid_head(format!("can't write request line for {:?}", self.version)));
        }

        dst.put_slice(self.method.as_str().as_bytes());
        dst.put_u8(b' ');
        put_latin1(dst, &self.target);
        dst.put_u8(b' ');
        dst.put_slice(version_label(self.version).as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }

    fn version(&self) -> Version {
        self.version
    }

    fn method(&self) -> Option<&Method> {
        Some(&self.method)
    }
}
