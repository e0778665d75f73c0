//! Encoder for chunked bodies
//!
//! Each [`PayloadItem::Chunk`] becomes one chunk with a hexadecimal size line.
//! [`PayloadItem::Eof`] writes the last chunk and the trailer section that
//! follows it.

use std::io::{self, Write};

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::header::put_field;
use crate::protocol::{PayloadItem, SendError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl Encoder<PayloadItem> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            // a zero sized chunk would end the body early
            PayloadItem::Chunk(bytes) if bytes.is_empty() => Ok(()),
            PayloadItem::Chunk(bytes) => {
                write!(Writer(dst), "{:X}\r\n", bytes.len())?;
                dst.reserve(bytes.len() + 2);
                dst.put_slice(&bytes);
                dst.put_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof(trailers) => {
                self.eof = true;
                dst.put_slice(b"0\r\n");
                for field in &trailers {
                    put_field(dst, field);
                }
                dst.put_slice(b"\r\n");
                trace!(trailers = trailers.len(), "wrote last chunk");
                Ok(())
            }
        }
    }
}

/// [`io::Write`] over a [`BytesMut`], so `write!` can format into it.
struct Writer<'a>(&'a mut BytesMut);

impl Write for Writer<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
