//! Streaming HTTP codecs for an intercepting proxy
//!
//! This crate reads HTTP traffic off a connection as complete messages that a
//! proxy can inspect, edit and write back out. It never rejects what it reads:
//! a message that breaks the rules is still handed out, together with the
//! defect that was found, so the proxy can show it and decide what to do.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 requests and responses, pipelining included
//! - Fixed length, chunked and read-until-close bodies, with trailers
//! - Header field order, case and duplicates preserved
//! - Content codings recorded with the head, decoded on demand
//! - Tunnels after `CONNECT` and protocol upgrades
//! - HTTP/2 frames, HPACK and per-stream message assembly on top of the same
//!   message type
//!
//! # Example
//!
//! ```
//! use futures::StreamExt;
//! use intercept_http::codec::RequestDecoder;
//! use intercept_http::protocol::Decoded;
//! use tokio_util::codec::FramedRead;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let input: &[u8] = b"GET /a HTTP/1.1\r\nHost: x\r\n\r\nPOST /b HTTP/1.1\r\nContent-Length: 2\r\n\r\nhi";
//! let mut requests = FramedRead::new(input, RequestDecoder::new());
//!
//! let Some(Ok(Decoded::Message(first))) = requests.next().await else { panic!("expected a request") };
//! assert_eq!(first.head().target(), "/a");
//!
//! let Some(Ok(Decoded::Message(second))) = requests.next().await else { panic!("expected a request") };
//! assert_eq!(second.body(), b"hi");
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`protocol`]: messages, heads, header fields and errors
//! - [`codec`]: the HTTP/1 message decoder and encoder
//! - [`h2`]: HTTP/2 frames and their translation to and from messages
//!
//! # Error Handling
//!
//! - [`protocol::ParseError`]: a defect found while decoding, attached to the
//!   message it was found in
//! - [`protocol::SendError`]: a message that can't be written
//! - [`protocol::HttpError`]: either of the above, or an I/O failure
//! - [`h2::Http2Error`]: an HTTP/2 failure with its error code and scope

pub mod codec;
pub mod h2;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
