//! HTTP/2 translation module
//!
//! This module maps HTTP/2 streams onto the same [`HttpMessage`](crate::protocol::HttpMessage)
//! type the HTTP/1 codec produces, so an intercepted HTTP/2 exchange can be
//! inspected and edited like an HTTP/1 one.
//!
//! # Architecture
//!
//! - Frames:
//!   - [`FrameDecoder`] / [`FrameEncoder`]: [`tokio_util::codec`] types for the
//!     frame layer, HPACK included
//!   - [`Frame`]: the frames the translator cares about, anything else passes
//!     through as [`RawFrame`]
//!
//! - Messages:
//!   - [`InboundStreams`]: assembles frames into messages per stream
//!   - [`message_frames`]: splits a message into frames for one stream
//!   - [`to_message`] / [`to_http2_headers`]: the header block conversion
//!     between pseudo-headers and start lines
//!
//! - [`Http2Error`]: failures tagged with an [`ErrorCode`] and the scope
//!   (stream or connection) the caller has to reset
//!
//! # Example
//!
//! ```
//! use intercept_http::h2::{FrameDecoder, FrameEncoder, Http2Config, InboundStreams, message_frames};
//! use intercept_http::protocol::{Request, RequestHead};
//! use http::{Method, Version};
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let config = Http2Config::default();
//! let mut request = Request::new(RequestHead::new(Method::POST, "/submit", Version::HTTP_11));
//! request.headers_mut().append("Host", "example.com");
//! request.append_body(b"name=value");
//!
//! let mut wire = BytesMut::new();
//! let mut encoder = FrameEncoder::new(&config);
//! for frame in message_frames(1, &request, &config) {
//!     encoder.encode(frame, &mut wire).unwrap();
//! }
//!
//! let mut decoder = FrameDecoder::new(&config);
//! let mut streams = InboundStreams::<RequestHead>::new();
//! let mut delivered = None;
//! while let Some(frame) = decoder.decode(&mut wire).unwrap() {
//!     delivered = streams.on_frame(frame).unwrap().or(delivered);
//! }
//!
//! let request = delivered.unwrap().into_message();
//! assert_eq!(request.head().target(), "https://example.com/submit");
//! assert_eq!(request.body(), b"name=value");
//! ```

mod block_check;
mod codec;
mod config;
mod convert;
mod error;
mod frame;
mod headers;
mod outbound;
mod streams;

pub use codec::{FrameDecoder, FrameEncoder};
pub use config::{DEFAULT_MAX_FRAME_SIZE, DEFAULT_MAX_HEADER_LIST_BYTES, DEFAULT_SCHEME, Http2Config, MAX_ALLOWED_FRAME_SIZE};
pub use convert::{Http2Head, add_fields, to_http2_headers, to_message, trailers_to_http2};
pub use error::{ErrorCode, ErrorScope, Http2Error};
pub use frame::{
    DEFAULT_WEIGHT, DataFrame, END_HEADERS, END_STREAM, FRAME_HEADER_SIZE, Frame, FrameHeader, FrameType, HeadersFrame,
    PADDED, PRIORITY, Priority, PushPromiseFrame, RawFrame, RstStreamFrame,
};
pub use headers::{Http2Headers, PseudoHeaders};
pub use outbound::message_frames;
pub use streams::{InboundStreams, StreamInfo, StreamMessage};
