//! HTTP/2 error types
//!
//! Every HTTP/2 failure carries its RFC 9113 §7 error code and whether it
//! only concerns one stream or the whole connection. A stream error leaves
//! every other stream on the connection untouched.

use std::fmt;
use std::io;

use thiserror::Error;

/// HTTP/2 error codes as defined in RFC 9113 Section 7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ErrorCode {
    NoError = 0x0,
    ProtocolError = 0x1,
    InternalError = 0x2,
    FlowControlError = 0x3,
    SettingsTimeout = 0x4,
    StreamClosed = 0x5,
    FrameSizeError = 0x6,
    RefusedStream = 0x7,
    Cancel = 0x8,
    CompressionError = 0x9,
    ConnectError = 0xa,
    EnhanceYourCalm = 0xb,
    InadequateSecurity = 0xc,
    Http11Required = 0xd,
}

impl ErrorCode {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Maps a wire value to a known code. Unknown codes are `None`; RFC 9113
    /// asks receivers to treat them like `INTERNAL_ERROR`.
    pub fn from_u32(code: u32) -> Option<Self> {
        let code = match code {
            0x0 => ErrorCode::NoError,
            0x1 => ErrorCode::ProtocolError,
            0x2 => ErrorCode::InternalError,
            0x3 => ErrorCode::FlowControlError,
            0x4 => ErrorCode::SettingsTimeout,
            0x5 => ErrorCode::StreamClosed,
            0x6 => ErrorCode::FrameSizeError,
            0x7 => ErrorCode::RefusedStream,
            0x8 => ErrorCode::Cancel,
            0x9 => ErrorCode::CompressionError,
            0xa => ErrorCode::ConnectError,
            0xb => ErrorCode::EnhanceYourCalm,
            0xc => ErrorCode::InadequateSecurity,
            0xd => ErrorCode::Http11Required,
            _ => return None,
        };
        Some(code)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorCode::NoError => "NO_ERROR",
            ErrorCode::ProtocolError => "PROTOCOL_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
            ErrorCode::FlowControlError => "FLOW_CONTROL_ERROR",
            ErrorCode::SettingsTimeout => "SETTINGS_TIMEOUT",
            ErrorCode::StreamClosed => "STREAM_CLOSED",
            ErrorCode::FrameSizeError => "FRAME_SIZE_ERROR",
            ErrorCode::RefusedStream => "REFUSED_STREAM",
            ErrorCode::Cancel => "CANCEL",
            ErrorCode::CompressionError => "COMPRESSION_ERROR",
            ErrorCode::ConnectError => "CONNECT_ERROR",
            ErrorCode::EnhanceYourCalm => "ENHANCE_YOUR_CALM",
            ErrorCode::InadequateSecurity => "INADEQUATE_SECURITY",
            ErrorCode::Http11Required => "HTTP_1_1_REQUIRED",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.name(), self.as_u32())
    }
}

/// What an error tears down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorScope {
    /// Only the stream with this id; answered with `RST_STREAM`.
    Stream(u32),
    /// The whole connection; answered with `GOAWAY`.
    Connection,
}

impl fmt::Display for ErrorScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorScope::Stream(id) => write!(f, "stream {id}"),
            ErrorScope::Connection => f.write_str("connection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} on {scope}: {reason}")]
pub struct Http2Error {
    scope: ErrorScope,
    code: ErrorCode,
    reason: String,
}

impl Http2Error {
    pub fn stream(stream_id: u32, code: ErrorCode, reason: impl Into<String>) -> Self {
        Self { scope: ErrorScope::Stream(stream_id), code, reason: reason.into() }
    }

    pub fn connection(code: ErrorCode, reason: impl Into<String>) -> Self {
        Self { scope: ErrorScope::Connection, code, reason: reason.into() }
    }

    pub fn scope(&self) -> ErrorScope {
        self.scope
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn is_connection_error(&self) -> bool {
        self.scope == ErrorScope::Connection
    }

    /// The failed stream, `None` for connection errors.
    pub fn stream_id(&self) -> Option<u32> {
        match self.scope {
            ErrorScope::Stream(id) => Some(id),
            ErrorScope::Connection => None,
        }
    }
}

impl From<io::Error> for Http2Error {
    fn from(e: io::Error) -> Self {
        Self::connection(ErrorCode::InternalError, e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_conversion() {
        assert_eq!(ErrorCode::NoError.as_u32(), 0x0);
        assert_eq!(ErrorCode::EnhanceYourCalm.as_u32(), 0xb);
        assert_eq!(ErrorCode::from_u32(0x9), Some(ErrorCode::CompressionError));
        assert_eq!(ErrorCode::from_u32(0xff), None);
    }

    #[test]
    fn display_names_scope_and_code() {
        let e = Http2Error::stream(3, ErrorCode::ProtocolError, "HTTP/2 headers does not have a method.");
        assert_eq!(e.to_string(), "PROTOCOL_ERROR (0x1) on stream 3: HTTP/2 headers does not have a method.");
        assert_eq!(e.stream_id(), Some(3));
        assert!(!e.is_connection_error());

        let e = Http2Error::connection(ErrorCode::FrameSizeError, "too big");
        assert_eq!(e.to_string(), "FRAME_SIZE_ERROR (0x6) on connection: too big");
        assert!(e.is_connection_error());
        assert_eq!(e.stream_id(), None);
    }
}
