//! Encoder for the head of an HTTP/1 message
//!
//! Writes the start line, every header field as `Name: Value\r\n` in order,
//! and the blank line that ends the head. Field names keep the spelling they
//! were received or added with.
//!
//! A message with trailer fields needs a chunked body to carry them. Its head
//! drops `Content-Length` and `Transfer-Encoding` and ends with
//! `Transfer-Encoding: chunked` instead; the trailers themselves are written
//! after the body by the message encoder.

use bytes::{BufMut, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use tokio_util::codec::Encoder;

use crate::protocol::{Head, HeaderField, HttpMessage, SendError};
use crate::utils::put_latin1;

/// Initial buffer size allocated for head serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for message heads implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl<H: Head> Encoder<&HttpMessage<H>> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the head of `message` into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if the head's protocol version can't be written on an
    /// HTTP/1 start line.
    fn encode(&mut self, message: &HttpMessage<H>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(INIT_HEADER_SIZE);
        message.head().write_start_line(dst)?;

        if message.trailers().is_empty() {
            for field in message.headers() {
                put_field(dst, field);
            }
        } else {
            for field in message.headers().iter().filter(|field| !is_framing(field)) {
                put_field(dst, field);
            }
            dst.put_slice(b"Transfer-Encoding: chunked\r\n");
        }
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

fn is_framing(field: &HeaderField) -> bool {
    field.is(CONTENT_LENGTH.as_str()) || field.is(TRANSFER_ENCODING.as_str())
}

pub(crate) fn put_field(dst: &mut BytesMut, field: &HeaderField) {
    put_latin1(dst, field.name());
    dst.put_slice(b": ");
    put_latin1(dst, field.value());
    dst.put_slice(b"\r\n");
}
