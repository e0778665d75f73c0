//! HTTP/1 body handling module for decoding message payloads
//!
//! # Components
//!
//! - [`ChunkedDecoder`]: Handles chunked transfer encoded payloads and trailers
//! - [`ChunkedEncoder`]: Writes a body and its trailers back as chunks
//! - [`LengthDecoder`]: Processes fixed-length payloads
//! - [`PayloadDecoder`]: Main decoder that coordinates the decoding strategies,
//!   including bodies that run until the connection closes
//!
//! Every decoder hands out bounded chunks, so one call never moves more than
//! the configured step size of body bytes.

mod chunked_decoder;
mod chunked_encoder;
mod length_decoder;
mod payload_decoder;

pub use chunked_encoder::ChunkedEncoder;
pub use payload_decoder::PayloadDecoder;
