//! Splitting an HTTP message into the frames that send it on one stream.

use bytes::Bytes;
use tracing::trace;

use crate::h2::config::Http2Config;
use crate::h2::convert::{Http2Head, to_http2_headers, trailers_to_http2};
use crate::h2::frame::{DataFrame, Frame, HeadersFrame};
use crate::protocol::HttpMessage;

/// Builds the frames that carry `message` on `stream_id`.
///
/// The head goes out as one HEADERS frame, the body as DATA frames of at
/// most the configured frame size, and non-empty trailers as a final HEADERS
/// frame. The last frame always ends the stream.
pub fn message_frames<H: Http2Head>(stream_id: u32, message: &HttpMessage<H>, config: &Http2Config) -> Vec<Frame> {
    let has_body = !message.body().is_empty();
    let has_trailers = !message.trailers().is_empty();

    let mut frames = Vec::with_capacity(2 + message.body_len() / config.max_frame_size());
    frames.push(Frame::Headers(HeadersFrame {
        stream_id,
        headers: to_http2_headers(message, config),
        priority: None,
        end_stream: !has_body && !has_trailers,
    }));

    if has_body {
        let body = Bytes::copy_from_slice(message.body());
        let mut chunks = body.chunks(config.max_frame_size()).peekable();
        while let Some(chunk) = chunks.next() {
            frames.push(Frame::Data(DataFrame {
                stream_id,
                data: body.slice_ref(chunk),
                padding: 0,
                end_stream: chunks.peek().is_none() && !has_trailers,
            }));
        }
    }

    if has_trailers {
        frames.push(Frame::Headers(HeadersFrame {
            stream_id,
            headers: trailers_to_http2(message.trailers()),
            priority: None,
            end_stream: true,
        }));
    }

    trace!(stream_id, frames = frames.len(), body_size = message.body_len(), "split message into frames");
    frames
}
