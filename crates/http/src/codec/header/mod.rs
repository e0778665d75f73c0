//! HTTP/1 head processing module for encoding and decoding message heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes a start line and header fields from raw bytes
//!   - Tolerates bare LF line endings and leading empty lines
//!   - Joins obsolete folded lines
//!   - Enforces the head size limit
//!
//! - [`HeaderEncoder`]: Encodes a start line and header fields to bytes
//!   - Keeps field order and spelling
//!   - Switches to a chunked head when the message has trailers

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::ParsedHead;
pub use header_encoder::HeaderEncoder;
pub(crate) use header_encoder::put_field;
