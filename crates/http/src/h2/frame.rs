//! HTTP/2 frame types (RFC 9113 Section 6)
//!
//! Header blocks are carried already HPACK-decoded as [`Http2Headers`];
//! CONTINUATION frames never show up here because the frame codec joins them
//! with the HEADERS or PUSH_PROMISE frame they continue.

use std::fmt;

use bytes::Bytes;

use crate::h2::error::ErrorCode;
use crate::h2::headers::Http2Headers;

/// HTTP/2 frame header size
pub const FRAME_HEADER_SIZE: usize = 9;

/// Stream weight used when a stream carries no priority information.
pub const DEFAULT_WEIGHT: u16 = 16;

pub const END_STREAM: u8 = 0x1;
pub const END_HEADERS: u8 = 0x4;
pub const PADDED: u8 = 0x8;
pub const PRIORITY: u8 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    Data = 0x0,
    Headers = 0x1,
    Priority = 0x2,
    RstStream = 0x3,
    Settings = 0x4,
    PushPromise = 0x5,
    Ping = 0x6,
    Goaway = 0x7,
    WindowUpdate = 0x8,
    Continuation = 0x9,
}

impl FrameType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(byte: u8) -> Option<Self> {
        let kind = match byte {
            0x0 => FrameType::Data,
            0x1 => FrameType::Headers,
            0x2 => FrameType::Priority,
            0x3 => FrameType::RstStream,
            0x4 => FrameType::Settings,
            0x5 => FrameType::PushPromise,
            0x6 => FrameType::Ping,
            0x7 => FrameType::Goaway,
            0x8 => FrameType::WindowUpdate,
            0x9 => FrameType::Continuation,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FrameType::Data => "DATA",
            FrameType::Headers => "HEADERS",
            FrameType::Priority => "PRIORITY",
            FrameType::RstStream => "RST_STREAM",
            FrameType::Settings => "SETTINGS",
            FrameType::PushPromise => "PUSH_PROMISE",
            FrameType::Ping => "PING",
            FrameType::Goaway => "GOAWAY",
            FrameType::WindowUpdate => "WINDOW_UPDATE",
            FrameType::Continuation => "CONTINUATION",
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:x})", self.name(), self.as_u8())
    }
}

/// The 9-byte header in front of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: usize,
    pub kind: u8,
    pub flags: u8,
    pub stream_id: u32,
}

impl FrameHeader {
    pub fn parse(bytes: &[u8; FRAME_HEADER_SIZE]) -> Self {
        let length = (usize::from(bytes[0]) << 16) | (usize::from(bytes[1]) << 8) | usize::from(bytes[2]);
        // the reserved bit is ignored
        let stream_id = u32::from_be_bytes([bytes[5], bytes[6], bytes[7], bytes[8]]) & 0x7FFF_FFFF;
        Self { length, kind: bytes[3], flags: bytes[4], stream_id }
    }

    pub fn to_bytes(&self) -> [u8; FRAME_HEADER_SIZE] {
        let length = u32::try_from(self.length).unwrap_or(u32::MAX).min(0x00FF_FFFF).to_be_bytes();
        let stream_id = (self.stream_id & 0x7FFF_FFFF).to_be_bytes();
        [length[1], length[2], length[3], self.kind, self.flags, stream_id[0], stream_id[1], stream_id[2], stream_id[3]]
    }

    pub fn frame_type(&self) -> Option<FrameType> {
        FrameType::from_u8(self.kind)
    }

    pub fn has_flag(&self, flag: u8) -> bool {
        self.flags & flag != 0
    }
}

/// Stream dependency and weight from a HEADERS or PRIORITY frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Priority {
    pub dependency: u32,
    /// Between 1 and 256; the wire carries the weight minus one.
    pub weight: u16,
    pub exclusive: bool,
}

impl Priority {
    pub fn parse(bytes: [u8; 5]) -> Self {
        let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        Self { dependency: raw & 0x7FFF_FFFF, weight: u16::from(bytes[4]) + 1, exclusive: raw & 0x8000_0000 != 0 }
    }

    pub fn to_bytes(&self) -> [u8; 5] {
        let mut raw = self.dependency & 0x7FFF_FFFF;
        if self.exclusive {
            raw |= 0x8000_0000;
        }
        let [a, b, c, d] = raw.to_be_bytes();
        let weight = u8::try_from(self.weight.clamp(1, 256) - 1).unwrap_or(u8::MAX);
        [a, b, c, d, weight]
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self { dependency: 0, weight: DEFAULT_WEIGHT, exclusive: false }
    }
}

/// A HEADERS frame together with its CONTINUATION frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadersFrame {
    pub stream_id: u32,
    pub headers: Http2Headers,
    pub priority: Option<Priority>,
    pub end_stream: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    pub stream_id: u32,
    pub data: Bytes,
    /// Bytes spent on padding, the pad length octet included.
    pub padding: usize,
    pub end_stream: bool,
}

impl DataFrame {
    /// The number of bytes this frame counts against flow control.
    pub fn flow_controlled_len(&self) -> usize {
        self.data.len() + self.padding
    }
}

/// A PUSH_PROMISE frame together with its CONTINUATION frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPromiseFrame {
    pub stream_id: u32,
    pub promised_id: u32,
    pub headers: Http2Headers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RstStreamFrame {
    pub stream_id: u32,
    pub code: u32,
}

impl RstStreamFrame {
    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_u32(self.code)
    }
}

/// Any frame passed through without interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub kind: u8,
    pub flags: u8,
    pub stream_id: u32,
    pub payload: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Headers(HeadersFrame),
    Data(DataFrame),
    PushPromise(PushPromiseFrame),
    RstStream(RstStreamFrame),
    Other(RawFrame),
}

impl Frame {
    pub fn stream_id(&self) -> u32 {
        match self {
            Frame::Headers(frame) => frame.stream_id,
            Frame::Data(frame) => frame.stream_id,
            Frame::PushPromise(frame) => frame.stream_id,
            Frame::RstStream(frame) => frame.stream_id,
            Frame::Other(frame) => frame.stream_id,
        }
    }

    pub fn is_end_stream(&self) -> bool {
        match self {
            Frame::Headers(frame) => frame.end_stream,
            Frame::Data(frame) => frame.end_stream,
            Frame::PushPromise(_) | Frame::RstStream(_) | Frame::Other(_) => false,
        }
    }
}
