//! Decoder for the head of an HTTP/1 message
//!
//! This module turns the raw bytes of a request or response head into a typed
//! [`Head`] plus the ordered [`HeaderFields`] that follow it.
//!
//! # Features
//!
//! - Incremental terminator search: scanning resumes where the previous call
//!   stopped, so byte-at-a-time input is not rescanned from the start
//! - Lenient line endings: `CRLF CRLF`, `LF LF` and `LF CRLF` all end a head
//! - Empty lines before the start line are skipped
//! - Obsolete line folding is joined into the previous field value
//! - Built-in protection against oversized heads
//!
//! # Implementation Details
//!
//! The decoder works in two stages:
//!
//! 1. Find the end of the head and split it off the source buffer
//! 2. Parse start line and fields from the split bytes
//!
//! Header text is decoded as ISO-8859-1 so arbitrary field bytes survive a
//! decode/encode cycle. When parsing fails the split bytes are handed back
//! with the error, since no message could be built from them.

use std::marker::PhantomData;

use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{Head, HeaderFields, HttpError, ParseError};
use crate::utils::latin1_to_string;

/// Result of decoding one head.
#[derive(Debug)]
pub enum ParsedHead<H> {
    Complete(H, HeaderFields),
    Malformed(ParseError, Bytes),
}

/// Decoder for HTTP message heads implementing the [`Decoder`] trait.
///
/// Parse failures are returned as [`ParsedHead::Malformed`] items; the error
/// type is only there to satisfy the trait.
#[derive(Debug)]
pub struct HeaderDecoder<H> {
    max_header_bytes: usize,
    /// Offset up to which the buffer is known not to contain a terminator.
    scanned: usize,
    _head: PhantomData<fn() -> H>,
}

impl<H> HeaderDecoder<H> {
    pub fn new(max_header_bytes: usize) -> Self {
        Self { max_header_bytes, scanned: 0, _head: PhantomData }
    }

    /// Forgets scanning progress. Needed whenever the source buffer is
    /// consumed by someone else.
    pub fn reset(&mut self) {
        self.scanned = 0;
    }

    /// Looks for the end of the head, returning the offset just past it.
    fn find_head_end(&mut self, buf: &[u8]) -> Option<usize> {
        let mut pos = self.scanned;
        while let Some(offset) = buf[pos..].iter().position(|&b| b == b'\n') {
            let lf = pos + offset;
            let rest = &buf[lf + 1..];
            if rest.starts_with(b"\n") {
                return Some(lf + 2);
            }
            if rest.starts_with(b"\r\n") {
                return Some(lf + 3);
            }
            if rest.is_empty() || rest == b"\r" {
                // can't tell yet, look at this LF again once more bytes arrive
                self.scanned = lf;
                return None;
            }
            pos = lf + 1;
        }
        self.scanned = buf.len();
        None
    }
}

impl<H: Head> Decoder for HeaderDecoder<H> {
    type Item = ParsedHead<H>;
    type Error = HttpError;

    /// Attempts to decode a message head from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ParsedHead::Complete(..)))` if a complete head was parsed
    /// - `Ok(Some(ParsedHead::Malformed(..)))` if the head is too large or
    ///   can't be parsed
    /// - `Ok(None)` if more data is needed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.scanned == 0 {
            let blank = src.iter().take_while(|&&b| b == b'\r' || b == b'\n').count();
            if blank > 0 {
                trace!(len = blank, "skipped empty lines before start line");
                src.advance(blank);
            }
        }

        if src.is_empty() {
            return Ok(None);
        }

        let Some(end) = self.find_head_end(src) else {
            if src.len() > self.max_header_bytes {
                let error = ParseError::too_large_header(src.len(), self.max_header_bytes);
                self.reset();
                return Ok(Some(ParsedHead::Malformed(error, src.split().freeze())));
            }
            return Ok(None);
        };

        self.reset();
        trace!(head_size = end, "found end of head");
        let raw = src.split_to(end).freeze();

        if end > self.max_header_bytes {
            let error = ParseError::too_large_header(end, self.max_header_bytes);
            return Ok(Some(ParsedHead::Malformed(error, raw)));
        }

        match parse_head(&raw) {
            Ok((head, headers)) => Ok(Some(ParsedHead::Complete(head, headers))),
            Err(error) => Ok(Some(ParsedHead::Malformed(error, raw))),
        }
    }
}

/// Parses start line and header fields out of a complete head.
fn parse_head<H: Head>(raw: &[u8]) -> Result<(H, HeaderFields), ParseError> {
    let text = latin1_to_string(raw);
    let mut lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

    let start_line = lines.next().unwrap_or_default();
    let head = H::parse_start_line(start_line)?;

    let mut fields: Vec<(String, String)> = Vec::with_capacity(16);
    for line in lines {
        if line.is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            let (_, value) =
                fields.last_mut().ok_or_else(|| ParseError::invalid_header("folded line without a preceding field"))?;
            let continuation = line.trim();
            if !value.is_empty() && !continuation.is_empty() {
                value.push(' ');
            }
            value.push_str(continuation);
            continue;
        }

        let (name, value) =
            line.split_once(':').ok_or_else(|| ParseError::invalid_header(format!("missing ':' in {line:?}")))?;
        let name = name.trim();
        ensure!(!name.is_empty(), ParseError::invalid_header(format!("empty field name in {line:?}")));

        fields.push((name.to_owned(), value.trim().to_owned()));
    }

    Ok((head, fields.into_iter().collect()))
}
