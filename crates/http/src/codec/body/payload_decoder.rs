//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for the ways an HTTP/1 body can be delimited:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Payloads that run until the connection closes
//!
//! Which one applies is decided by the message decoder from the head and fields.

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::codec::limits::DecoderLimits;
use crate::protocol::{HttpError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Take everything until the peer closes the connection
    UntilClose { max_step: usize },
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for chunked transfer encoding.
    pub fn chunked(limits: &DecoderLimits) -> Self {
        let decoder = ChunkedDecoder::new(limits.max_line_bytes(), limits.max_header_bytes(), limits.max_step_bytes());
        Self { kind: Kind::Chunked(decoder) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    ///
    /// # Arguments
    /// * `size` - The expected content length in bytes
    pub fn fix_length(size: u64, limits: &DecoderLimits) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size, limits.max_step_bytes())) }
    }

    /// Creates a PayloadDecoder for a body delimited by connection close.
    pub fn until_close(limits: &DecoderLimits) -> Self {
        Self { kind: Kind::UntilClose { max_step: limits.max_step_bytes() } }
    }

    /// Returns whether this decoder handles chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    /// Returns whether this decoder handles fixed-length payloads.
    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    /// Returns whether the body only ends when the connection closes.
    pub fn is_until_close(&self) -> bool {
        matches!(self.kind, Kind::UntilClose { .. })
    }
}

/// Implementation of the Decoder trait for HTTP payloads.
///
/// Delegates to the appropriate decoder based on the payload type.
impl Decoder for PayloadDecoder {
    type Item = PayloadItem;
    type Error = HttpError;

    /// Decodes bytes from the input buffer using the appropriate strategy.
    ///
    /// A body that runs until close never yields `Eof` here; the caller ends
    /// it when the connection closes.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => length_decoder.decode(src),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose { max_step } => {
                if src.is_empty() {
                    return Ok(None);
                }
                let len = src.len().min(*max_step);
                Ok(Some(PayloadItem::Chunk(src.split_to(len).freeze())))
            }
        }
    }
}
