//! HTTP/2 frame codec
//!
//! [`FrameDecoder`] cuts a connection's byte stream into [`Frame`]s: it checks
//! frame sizes and padding, joins CONTINUATION frames onto the header block
//! they continue and runs every block through one connection-wide HPACK
//! decoder. [`FrameEncoder`] does the reverse and splits header blocks that
//! don't fit one frame.
//!
//! The connection preface, SETTINGS negotiation and flow control stay with the
//! caller; frames this module doesn't interpret are handed out as
//! [`Frame::Other`].

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::{trace, warn};

use crate::ensure;
use crate::h2::block_check::check_block;
use crate::h2::config::Http2Config;
use crate::h2::error::{ErrorCode, Http2Error};
use crate::h2::frame::{
    DataFrame, END_HEADERS, END_STREAM, FRAME_HEADER_SIZE, Frame, FrameHeader, FrameType, HeadersFrame, PADDED,
    PRIORITY, Priority, PushPromiseFrame, RawFrame, RstStreamFrame,
};
use crate::h2::headers::Http2Headers;
use crate::utils::{latin1_to_bytes, latin1_to_string};

/// Decodes frames received on one connection.
pub struct FrameDecoder {
    max_frame_size: usize,
    max_header_list_bytes: usize,
    hpack: hpack::Decoder<'static>,
    /// A header block still waiting for CONTINUATION frames.
    pending: Option<PendingBlock>,
}

struct PendingBlock {
    stream_id: u32,
    kind: BlockKind,
    fragments: BytesMut,
}

enum BlockKind {
    Headers { priority: Option<Priority>, end_stream: bool },
    PushPromise { promised_id: u32 },
}

impl FrameDecoder {
    pub fn new(config: &Http2Config) -> Self {
        Self {
            max_frame_size: config.max_frame_size(),
            max_header_list_bytes: config.max_header_list_bytes(),
            hpack: hpack::Decoder::new(),
            pending: None,
        }
    }

    /// Returns true while a header block waits for CONTINUATION frames.
    pub fn is_reading_header_block(&self) -> bool {
        self.pending.is_some()
    }

    fn decode_frame(&mut self, header: FrameHeader, payload: Bytes) -> Result<Option<Frame>, Http2Error> {
        let kind = header.frame_type();

        if let Some(pending) = &self.pending {
            ensure!(
                kind == Some(FrameType::Continuation) && header.stream_id == pending.stream_id,
                protocol_error(format!(
                    "expected CONTINUATION for stream {} but received frame type 0x{:x} on stream {}",
                    pending.stream_id, header.kind, header.stream_id
                ))
            );
        }

        match kind {
            Some(FrameType::Data) => {
                ensure_stream(&header)?;
                let (data, padding) = strip_padding(&header, payload)?;
                let end_stream = header.has_flag(END_STREAM);
                Ok(Some(Frame::Data(DataFrame { stream_id: header.stream_id, data, padding, end_stream })))
            }

            Some(FrameType::Headers) => {
                ensure_stream(&header)?;
                let (mut fragment, _) = strip_padding(&header, payload)?;
                let priority = if header.has_flag(PRIORITY) {
                    ensure!(fragment.len() >= 5, frame_size_error("HEADERS frame too short for its priority block"));
                    let raw = fragment.split_to(5);
                    Some(Priority::parse([raw[0], raw[1], raw[2], raw[3], raw[4]]))
                } else {
                    None
                };
                let kind = BlockKind::Headers { priority, end_stream: header.has_flag(END_STREAM) };
                self.start_block(&header, kind, &fragment)
            }

            Some(FrameType::PushPromise) => {
                ensure_stream(&header)?;
                let (mut fragment, _) = strip_padding(&header, payload)?;
                ensure!(fragment.len() >= 4, frame_size_error("PUSH_PROMISE frame too short for the promised stream id"));
                let promised_id = fragment.get_u32() & 0x7FFF_FFFF;
                self.start_block(&header, BlockKind::PushPromise { promised_id }, &fragment)
            }

            Some(FrameType::Continuation) => {
                let Some(mut pending) = self.pending.take() else {
                    return Err(protocol_error(format!(
                        "CONTINUATION frame received on stream {} without a header block in progress",
                        header.stream_id
                    )));
                };
                self.append_fragment(&mut pending, &payload)?;
                if header.has_flag(END_HEADERS) {
                    return self.finish_block(pending).map(Some);
                }
                self.pending = Some(pending);
                Ok(None)
            }

            Some(FrameType::RstStream) => {
                ensure_stream(&header)?;
                ensure!(payload.len() == 4, frame_size_error("RST_STREAM frame must carry exactly 4 bytes"));
                let code = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]);
                Ok(Some(Frame::RstStream(RstStreamFrame { stream_id: header.stream_id, code })))
            }

            _ => Ok(Some(Frame::Other(RawFrame {
                kind: header.kind,
                flags: header.flags,
                stream_id: header.stream_id,
                payload,
            }))),
        }
    }

    fn start_block(&mut self, header: &FrameHeader, kind: BlockKind, fragment: &[u8]) -> Result<Option<Frame>, Http2Error> {
        let mut pending = PendingBlock { stream_id: header.stream_id, kind, fragments: BytesMut::new() };
        self.append_fragment(&mut pending, fragment)?;

        if header.has_flag(END_HEADERS) {
            return self.finish_block(pending).map(Some);
        }
        trace!(stream_id = header.stream_id, "waiting for CONTINUATION frames");
        self.pending = Some(pending);
        Ok(None)
    }

    fn append_fragment(&self, pending: &mut PendingBlock, fragment: &[u8]) -> Result<(), Http2Error> {
        let size = pending.fragments.len() + fragment.len();
        if size > self.max_header_list_bytes {
            warn!(stream_id = pending.stream_id, size, max_size = self.max_header_list_bytes, "header block too large");
            return Err(Http2Error::connection(
                ErrorCode::EnhanceYourCalm,
                format!("header block of {size} bytes exceeds the {} byte limit", self.max_header_list_bytes),
            ));
        }
        pending.fragments.extend_from_slice(fragment);
        Ok(())
    }

    fn finish_block(&mut self, pending: PendingBlock) -> Result<Frame, Http2Error> {
        check_block(&pending.fragments)?;
        let fields = self.hpack.decode(&pending.fragments).map_err(|e| {
            Http2Error::connection(ErrorCode::CompressionError, format!("failed to decode header block: {e:?}"))
        })?;
        let headers: Http2Headers =
            fields.iter().map(|(name, value)| (latin1_to_string(name), latin1_to_string(value))).collect();

        let frame = match pending.kind {
            BlockKind::Headers { priority, end_stream } => {
                Frame::Headers(HeadersFrame { stream_id: pending.stream_id, headers, priority, end_stream })
            }
            BlockKind::PushPromise { promised_id } => {
                Frame::PushPromise(PushPromiseFrame { stream_id: pending.stream_id, promised_id, headers })
            }
        };
        Ok(frame)
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(&Http2Config::default())
    }
}

impl std::fmt::Debug for FrameDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameDecoder")
            .field("max_frame_size", &self.max_frame_size)
            .field("max_header_list_bytes", &self.max_header_list_bytes)
            .field("reading_header_block", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}

impl Decoder for FrameDecoder {
    type Item = Frame;
    type Error = Http2Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let Some(header_bytes) = src.first_chunk::<FRAME_HEADER_SIZE>() else {
                return Ok(None);
            };
            let header = FrameHeader::parse(header_bytes);

            ensure!(
                header.length <= self.max_frame_size,
                Http2Error::connection(
                    ErrorCode::FrameSizeError,
                    format!("frame of {} bytes exceeds the {} byte limit", header.length, self.max_frame_size),
                )
            );

            let frame_len = FRAME_HEADER_SIZE + header.length;
            if src.len() < frame_len {
                src.reserve(frame_len - src.len());
                return Ok(None);
            }

            src.advance(FRAME_HEADER_SIZE);
            let payload = src.split_to(header.length).freeze();
            trace!(kind = header.kind, flags = header.flags, stream_id = header.stream_id, len = header.length, "frame");

            if let Some(frame) = self.decode_frame(header, payload)? {
                return Ok(Some(frame));
            }
        }
    }
}

fn protocol_error(reason: String) -> Http2Error {
    Http2Error::connection(ErrorCode::ProtocolError, reason)
}

fn frame_size_error(reason: &str) -> Http2Error {
    Http2Error::connection(ErrorCode::FrameSizeError, reason)
}

fn ensure_stream(header: &FrameHeader) -> Result<(), Http2Error> {
    ensure!(header.stream_id != 0, protocol_error(format!("frame type 0x{:x} received on stream 0", header.kind)));
    Ok(())
}

/// Splits the padding off a payload, returning the content and the number of
/// bytes spent on padding.
fn strip_padding(header: &FrameHeader, mut payload: Bytes) -> Result<(Bytes, usize), Http2Error> {
    if !header.has_flag(PADDED) {
        return Ok((payload, 0));
    }

    ensure!(!payload.is_empty(), frame_size_error("padded frame without a pad length"));
    let pad_len = usize::from(payload.get_u8());
    ensure!(
        pad_len <= payload.len(),
        protocol_error(format!(
            "padding of {pad_len} bytes exceeds the {} byte frame payload on stream {}",
            payload.len(),
            header.stream_id
        ))
    );

    payload.truncate(payload.len() - pad_len);
    Ok((payload, pad_len + 1))
}

/// Encodes frames sent on one connection.
pub struct FrameEncoder {
    max_frame_size: usize,
    hpack: hpack::Encoder<'static>,
}

impl FrameEncoder {
    pub fn new(config: &Http2Config) -> Self {
        Self { max_frame_size: config.max_frame_size(), hpack: hpack::Encoder::new() }
    }

    fn encode_block(&mut self, headers: &Http2Headers) -> Vec<u8> {
        let fields: Vec<_> = headers.iter().map(|(name, value)| (latin1_to_bytes(name), latin1_to_bytes(value))).collect();
        self.hpack.encode(fields.iter().map(|(name, value)| (&**name, &**value)))
    }

    /// Writes a header block as one HEADERS or PUSH_PROMISE frame followed by
    /// as many CONTINUATION frames as needed.
    fn put_header_block(&self, kind: FrameType, flags: u8, stream_id: u32, prefix: &[u8], block: &[u8], dst: &mut BytesMut) {
        let first_len = block.len().min(self.max_frame_size - prefix.len());
        let (first, mut rest) = block.split_at(first_len);

        let flags = if rest.is_empty() { flags | END_HEADERS } else { flags };
        put_frame_header(dst, kind, flags, stream_id, prefix.len() + first.len());
        dst.put_slice(prefix);
        dst.put_slice(first);

        while !rest.is_empty() {
            let (fragment, remaining) = rest.split_at(rest.len().min(self.max_frame_size));
            rest = remaining;
            let flags = if rest.is_empty() { END_HEADERS } else { 0 };
            put_frame_header(dst, FrameType::Continuation, flags, stream_id, fragment.len());
            dst.put_slice(fragment);
        }
    }
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new(&Http2Config::default())
    }
}

impl std::fmt::Debug for FrameEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameEncoder").field("max_frame_size", &self.max_frame_size).finish_non_exhaustive()
    }
}

impl Encoder<Frame> for FrameEncoder {
    type Error = Http2Error;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match frame {
            Frame::Headers(frame) => {
                let block = self.encode_block(&frame.headers);
                let mut flags = if frame.end_stream { END_STREAM } else { 0 };
                let prefix = match frame.priority {
                    Some(priority) => {
                        flags |= PRIORITY;
                        priority.to_bytes().to_vec()
                    }
                    None => Vec::new(),
                };
                self.put_header_block(FrameType::Headers, flags, frame.stream_id, &prefix, &block, dst);
            }

            Frame::PushPromise(frame) => {
                let block = self.encode_block(&frame.headers);
                let prefix = (frame.promised_id & 0x7FFF_FFFF).to_be_bytes();
                self.put_header_block(FrameType::PushPromise, 0, frame.stream_id, &prefix, &block, dst);
            }

            Frame::Data(frame) => {
                let len = frame.flow_controlled_len();
                ensure!(
                    len <= self.max_frame_size,
                    Http2Error::stream(
                        frame.stream_id,
                        ErrorCode::FrameSizeError,
                        format!("DATA frame of {len} bytes exceeds the {} byte limit", self.max_frame_size),
                    )
                );
                let mut flags = if frame.end_stream { END_STREAM } else { 0 };
                let pad_len = frame.padding.saturating_sub(1);
                if frame.padding > 0 {
                    flags |= PADDED;
                }
                put_frame_header(dst, FrameType::Data, flags, frame.stream_id, len);
                if frame.padding > 0 {
                    dst.put_u8(u8::try_from(pad_len).unwrap_or(u8::MAX));
                }
                dst.put_slice(&frame.data);
                dst.put_bytes(0, pad_len);
            }

            Frame::RstStream(frame) => {
                put_frame_header(dst, FrameType::RstStream, 0, frame.stream_id, 4);
                dst.put_u32(frame.code);
            }

            Frame::Other(frame) => {
                let header =
                    FrameHeader { length: frame.payload.len(), kind: frame.kind, flags: frame.flags, stream_id: frame.stream_id };
                dst.put_slice(&header.to_bytes());
                dst.put_slice(&frame.payload);
            }
        }
        Ok(())
    }
}

fn put_frame_header(dst: &mut BytesMut, kind: FrameType, flags: u8, stream_id: u32, length: usize) {
    let header = FrameHeader { length, kind: kind.as_u8(), flags, stream_id };
    dst.reserve(FRAME_HEADER_SIZE + length);
    dst.put_slice(&header.to_bytes());
}
