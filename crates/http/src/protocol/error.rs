use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

/// Why a message could not be decoded.
///
/// Parse errors never abort a decoder. They travel with the message they
/// belong to, which is why the type is cheap to clone and compare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("line length exceed the limit {max_size}")]
    LineTooLong { max_size: usize },

    #[error("invalid start line: {reason}")]
    InvalidStartLine { reason: String },

    #[error("invalid http version: {version}")]
    InvalidVersion { version: String },

    #[error("invalid http method: {method}")]
    InvalidMethod { method: String },

    #[error("invalid status code: {status}")]
    InvalidStatus { status: String },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("invalid chunk size: {reason}")]
    InvalidChunkSize { reason: String },

    #[error("connection closed before the full header was received")]
    IncompleteHeader,

    #[error("connection closed before the full body was received")]
    IncompleteBody,
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn line_too_long(max_size: usize) -> Self {
        Self::LineTooLong { max_size }
    }

    pub fn invalid_start_line<S: ToString>(str: S) -> Self {
        Self::InvalidStartLine { reason: str.to_string() }
    }

    pub fn invalid_version<S: ToString>(str: S) -> Self {
        Self::InvalidVersion { version: str.to_string() }
    }

    pub fn invalid_method<S: ToString>(str: S) -> Self {
        Self::InvalidMethod { method: str.to_string() }
    }

    pub fn invalid_status<S: ToString>(str: S) -> Self {
        Self::InvalidStatus { status: str.to_string() }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn invalid_chunk_size<S: ToString>(str: S) -> Self {
        Self::InvalidChunkSize { reason: str.to_string() }
    }

    /// Returns true for the conditions raised when the peer closed early.
    pub fn is_premature_closure(&self) -> bool {
        matches!(self, Self::IncompleteHeader | Self::IncompleteBody)
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid message head: {reason}")]
    InvalidHead { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_head<S: ToString>(str: S) -> Self {
        Self::InvalidHead { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Why a body could not be decoded from its content codings.
#[derive(Error, Debug)]
pub enum ContentCodingError {
    #[error("unsupported content coding {coding}")]
    Unsupported { coding: String },

    #[error("body is not valid {coding}: {source}")]
    Corrupt {
        coding: String,
        #[source]
        source: io::Error,
    },
}
