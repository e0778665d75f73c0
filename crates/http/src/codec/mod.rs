//! HTTP/1 codec module for decoding and encoding whole messages
//!
//! This module turns a byte stream into [`HttpMessage`](crate::protocol::HttpMessage)s
//! and back. Both directions are [`tokio_util::codec`] types, so they plug into
//! `FramedRead` / `FramedWrite` or can be driven by hand.
//!
//! # Architecture
//!
//! - Decoding:
//!   - [`MessageDecoder`]: the state machine, with the [`RequestDecoder`] and
//!     [`ResponseDecoder`] aliases
//!   - Head parsing via the `header` module
//!   - Body framing via the `body` module (fixed length, chunked, until close)
//!
//! - Encoding:
//!   - [`MessageEncoder`]: start line, fields and body; a chunked body with a
//!     trailer section when the message has trailers
//!
//! - [`DecoderLimits`]: the resource bounds applied while decoding
//!
//! # Example
//!
//! ```
//! use intercept_http::codec::{ResponseDecoder, ResponseEncoder};
//! use intercept_http::protocol::Decoded;
//! use tokio_util::codec::{Decoder, Encoder};
//! use bytes::BytesMut;
//!
//! let mut decoder = ResponseDecoder::new();
//! let mut input = BytesMut::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n2\r\nhi\r\n0\r\n\r\n");
//! let Some(Decoded::Message(response)) = decoder.decode(&mut input).unwrap() else {
//!     panic!("expected a response");
//! };
//!
//! let mut output = BytesMut::new();
//! ResponseEncoder::new().encode(&response, &mut output).unwrap();
//! assert_eq!(&output[..], b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi");
//! ```

mod body;
mod header;
mod limits;
mod message_decoder;
mod message_encoder;

pub use limits::{DecoderLimits, DEFAULT_MAX_HEADER_BYTES, DEFAULT_MAX_LINE_BYTES, DEFAULT_MAX_STEP_BYTES};
pub use message_decoder::{MessageDecoder, RequestDecoder, ResponseDecoder};
pub use message_encoder::{MessageEncoder, RequestEncoder, ResponseEncoder};
