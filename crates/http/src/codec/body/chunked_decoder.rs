//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module provides functionality to decode HTTP messages that use chunked transfer encoding
//! as specified in [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1).
//!
//! The decoder is lenient in the ways real peers are sloppy: chunk-size lines
//! may carry surrounding whitespace, control characters and extensions, and
//! the delimiter after chunk data is skipped up to the next LF. Every line it
//! buffers is bounded, so an endless extension or delimiter is rejected
//! instead of held in memory.

use std::mem;
use std::task::Poll;

use crate::ensure;
use crate::protocol::{HeaderFields, HttpError, ParseError, PayloadItem};
use crate::utils::latin1_to_string;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

/// A decoder for handling HTTP chunked transfer encoding.
///
/// The decoder processes incoming bytes according to the chunked format:
/// - Each chunk starts with its size in hexadecimal, optionally followed by extensions
/// - Then the chunk data and a line break
/// - A zero-sized chunk is followed by optional trailer fields and an empty line
///
/// Trailer fields are handed out with the final [`PayloadItem::Eof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    trailers: HeaderFields,
    trailer_bytes: usize,
    max_line_bytes: usize,
    max_trailer_bytes: usize,
    max_step: usize,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder instance.
    ///
    /// The decoder starts in the Size state, ready to read the size of the first chunk.
    pub fn new(max_line_bytes: usize, max_trailer_bytes: usize, max_step: usize) -> Self {
        Self {
            state: Size,
            trailers: HeaderFields::new(),
            trailer_bytes: 0,
            max_line_bytes: max_line_bytes.max(1),
            max_trailer_bytes,
            max_step: max_step.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk-size line
    Size,
    /// Read chunk data
    Data { remaining: u64 },
    /// Skip the line break after chunk data
    Delimiter { skipped: usize },
    /// Read trailer lines until an empty one
    Trailer,
    /// Final state after the empty line closing the trailer section
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = HttpError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when chunk data is available
    /// - `Ok(Some(PayloadItem::Eof(trailers)))` when the final chunk and trailers are processed
    /// - `Ok(None)` when more data is needed
    /// - `Err(HttpError::Parse { .. })` if the chunked encoding is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!(trailers = self.trailers.len(), "finished reading chunked data");
                return Ok(Some(PayloadItem::Eof(mem::take(&mut self.trailers))));
            }

            if src.is_empty() {
                // need more data
                return Ok(None);
            }

            let mut buf = None;

            self.state = match self.step(src, &mut buf) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e.into()),
            };

            if let Some(bytes) = buf {
                trace!(len = bytes.len(), "read chunked bytes");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }
        }
    }
}

impl ChunkedDecoder {
    /// Processes the next step in the chunked decoding state machine.
    fn step(&mut self, src: &mut BytesMut, buf: &mut Option<Bytes>) -> Poll<Result<ChunkedState, ParseError>> {
        match self.state {
            Size => self.read_size(src),
            Data { remaining } => self.read_data(src, remaining, buf),
            Delimiter { skipped } => self.skip_delimiter(src, skipped),
            Trailer => self.read_trailer(src),
            End => Poll::Ready(Ok(End)),
        }
    }

    /// Reads the chunk-size line and parses the size.
    ///
    /// # State Transitions
    /// - size 0: move to Trailer
    /// - size > 0: move to Data
    fn read_size(&mut self, src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        let line = match take_line(src, self.max_line_bytes) {
            Poll::Ready(Ok(line)) => line,
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Pending => return Poll::Pending,
        };

        Poll::Ready(parse_chunk_size(&line).map(|size| {
            trace!(size, "read chunk size");
            if size == 0 { Trailer } else { Data { remaining: size } }
        }))
    }

    /// Reads up to `remaining` bytes of chunk data, bounded by the step size.
    fn read_data(
        &self,
        src: &mut BytesMut,
        remaining: u64,
        buf: &mut Option<Bytes>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        let read_size = std::cmp::min(remaining, std::cmp::min(src.len(), self.max_step) as u64);
        *buf = Some(src.split_to(read_size as usize).freeze());

        match remaining - read_size {
            0 => Poll::Ready(Ok(Delimiter { skipped: 0 })),
            remaining => Poll::Ready(Ok(Data { remaining })),
        }
    }

    /// Skips everything up to and including the next LF.
    fn skip_delimiter(&self, src: &mut BytesMut, skipped: usize) -> Poll<Result<ChunkedState, ParseError>> {
        match src.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                let skipped = skipped + pos;
                if skipped > self.max_line_bytes {
                    return Poll::Ready(Err(ParseError::line_too_long(self.max_line_bytes)));
                }
                src.advance(pos + 1);
                Poll::Ready(Ok(Size))
            }
            None => {
                let skipped = skipped + src.len();
                src.clear();
                if skipped > self.max_line_bytes {
                    return Poll::Ready(Err(ParseError::line_too_long(self.max_line_bytes)));
                }
                Poll::Ready(Ok(Delimiter { skipped }))
            }
        }
    }

    /// Reads one trailer line.
    ///
    /// # State Transitions
    /// - empty line: move to End
    /// - `name: value` line: stay in Trailer
    fn read_trailer(&mut self, src: &mut BytesMut) -> Poll<Result<ChunkedState, ParseError>> {
        let line = match take_line(src, self.max_line_bytes) {
            Poll::Ready(Ok(line)) => line,
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
            Poll::Pending => return Poll::Pending,
        };

        if line.is_empty() {
            return Poll::Ready(Ok(End));
        }

        self.trailer_bytes += line.len();
        if self.trailer_bytes > self.max_trailer_bytes {
            return Poll::Ready(Err(ParseError::too_large_header(self.trailer_bytes, self.max_trailer_bytes)));
        }

        let line = latin1_to_string(&line);
        let Some((name, value)) = line.split_once(':') else {
            return Poll::Ready(Err(ParseError::invalid_header(format!("malformed trailer {line:?}"))));
        };
        let name = name.trim();
        if name.is_empty() {
            return Poll::Ready(Err(ParseError::invalid_header(format!("malformed trailer {line:?}"))));
        }

        self.trailers.append(name, value.trim());
        Poll::Ready(Ok(Trailer))
    }
}

/// Splits one line off `src`, without its LF or CRLF ending.
///
/// `max_line_bytes` bounds the line content; the line ending is not counted.
fn take_line(src: &mut BytesMut, max_line_bytes: usize) -> Poll<Result<Bytes, ParseError>> {
    let Some(pos) = src.iter().position(|&b| b == b'\n') else {
        // room for a CR that may still be followed by its LF
        if src.len() > max_line_bytes + 1 {
            return Poll::Ready(Err(ParseError::line_too_long(max_line_bytes)));
        }
        return Poll::Pending;
    };

    let len = if pos > 0 && src[pos - 1] == b'\r' { pos - 1 } else { pos };
    if len > max_line_bytes {
        return Poll::Ready(Err(ParseError::line_too_long(max_line_bytes)));
    }

    let mut line = src.split_to(pos + 1);
    line.truncate(len);
    Poll::Ready(Ok(line.freeze()))
}

/// Parses a chunk-size line.
///
/// Surrounding whitespace and control characters are trimmed, then the size
/// ends at the first `;`, whitespace or control character. What remains must
/// be a non-empty run of hex digits that fits in a `u64`.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let is_separator = |b: &u8| *b <= b' ' || *b == 0x7F;

    let start = line.iter().position(|b| !is_separator(b)).unwrap_or(line.len());
    let line = &line[start..];
    let end = line.iter().position(|b| *b == b';' || is_separator(b)).unwrap_or(line.len());
    let digits = &line[..end];

    ensure!(!digits.is_empty(), ParseError::invalid_chunk_size("missing chunk size"));

    let mut size: u64 = 0;
    for &b in digits {
        let digit = char::from(b)
            .to_digit(16)
            .ok_or_else(|| ParseError::invalid_chunk_size(format!("{:?} is not hex", latin1_to_string(digits))))?;
        size = size
            .checked_mul(16)
            .and_then(|size| size.checked_add(u64::from(digit)))
            .ok_or_else(|| ParseError::invalid_chunk_size("invalid overflow chunked length"))?;
    }
    Ok(size)
}
