//! Core HTTP message model and error types.
//!
//! This module provides the structures every other part of the crate works
//! with: the message produced by the decoders and consumed by the encoders,
//! the ordered header multimap, and the error types.
//!
//! # Architecture
//!
//! - **Header fields** (`header`): [`HeaderFields`], an ordered,
//!   case-insensitive multimap that keeps duplicates and original spelling
//!
//! - **Heads** (`head`, `request`, `response`): the start line half of
//!   a message
//!   - [`RequestHead`]: method, raw request target and version
//!   - [`ResponseHead`]: version, status and reason phrase
//!   - [`Head`]: the trait that keeps requests and responses apart
//!
//! - **Messages** (`message`):
//!   - [`HttpMessage`]: head, headers, body buffer and separate trailers
//!   - [`Decoded`]: what a decoder hands out (message, malformed message or
//!     tunnelled bytes)
//!   - [`PayloadItem`]: body chunks produced by the body decoders
//!
//! - **Content codings** (`content_coding`): [`ContentCoding`], the
//!   `Content-Encoding` tokens recorded on decoded messages
//!
//! - **Error Handling** (`error`):
//!   - [`ParseError`]: decode problems, attached to messages
//!   - [`SendError`]: encode problems
//!   - [`ContentCodingError`]: a body that can't be decoded
//!   - [`HttpError`]: the error type of the codec traits

mod header;
pub use header::HeaderField;
pub use header::HeaderFields;

mod head;
pub use head::Head;

mod message;
pub use message::Decoded;
pub use message::HttpMessage;
pub use message::MalformedMessage;
pub use message::PayloadItem;
pub use message::Request;
pub use message::Response;

mod content_coding;
pub use content_coding::ContentCoding;

mod request;
pub use request::RequestHead;

mod response;
pub use response::ResponseHead;

mod error;
pub use error::ContentCodingError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

