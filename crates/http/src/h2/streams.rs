//! Per-stream assembly of HTTP/2 messages.
//!
//! [`InboundStreams`] collects the frames received on one connection by
//! stream id and hands out a complete [`HttpMessage`] once its stream ends.
//! It is typed by the half it receives: a server builds an
//! `InboundStreams<RequestHead>`, a client an `InboundStreams<ResponseHead>`.
//!
//! # Stream lifecycle
//!
//! - first HEADERS: a new message, or the response of a promised stream
//! - DATA: appended to the body
//! - HEADERS after the first: trailers
//! - END_STREAM: the message is completed and delivered, the entry removed
//! - RST_STREAM: the entry is removed, nothing is delivered
//!
//! Interim (1xx) responses are delivered as soon as they arrive; the stream
//! stays open for the final response. A request carrying
//! `Expect: 100-continue` is delivered twice: its head right away, so the
//! consumer can answer before any DATA is sent, and the whole message once
//! the stream ends. Both early deliveries are flagged with
//! [`StreamMessage::is_interim`].

use std::collections::HashMap;

use http::header::CONTENT_LENGTH;
use tracing::{debug, trace, warn};

use crate::h2::convert::{Http2Head, add_fields, to_message};
use crate::h2::error::{ErrorCode, Http2Error};
use crate::h2::frame::{DEFAULT_WEIGHT, Frame, Priority};
use crate::h2::headers::Http2Headers;
use crate::protocol::{HttpMessage, Request};

/// Priority and push metadata of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamInfo {
    id: u32,
    dependency: u32,
    weight: u16,
    exclusive: bool,
    promised: bool,
}

impl StreamInfo {
    pub fn new(id: u32) -> Self {
        Self { id, dependency: 0, weight: DEFAULT_WEIGHT, exclusive: false, promised: false }
    }

    /// A stream reserved by a PUSH_PROMISE received on `associated_id`.
    pub fn promised(id: u32, associated_id: u32) -> Self {
        Self { dependency: associated_id, promised: true, ..Self::new(id) }
    }

    pub fn set_priority(&mut self, priority: Priority) {
        self.dependency = priority.dependency;
        self.weight = priority.weight;
        self.exclusive = priority.exclusive;
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn dependency(&self) -> u32 {
        self.dependency
    }

    pub fn weight(&self) -> u16 {
        self.weight
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn is_promised(&self) -> bool {
        self.promised
    }
}

/// A message delivered by [`InboundStreams`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMessage<H> {
    info: StreamInfo,
    message: HttpMessage<H>,
    promised_request: Option<Request>,
    interim: bool,
}

impl<H> StreamMessage<H> {
    pub fn info(&self) -> &StreamInfo {
        &self.info
    }

    pub fn message(&self) -> &HttpMessage<H> {
        &self.message
    }

    /// The request announced by the PUSH_PROMISE that opened this stream.
    pub fn promised_request(&self) -> Option<&Request> {
        self.promised_request.as_ref()
    }

    /// True for a 1xx response or the early head of a request waiting for
    /// `100 Continue`; the stream is still open and more will follow.
    pub fn is_interim(&self) -> bool {
        self.interim
    }

    pub fn into_message(self) -> HttpMessage<H> {
        self.message
    }

    pub fn into_parts(self) -> (StreamInfo, HttpMessage<H>, Option<Request>) {
        (self.info, self.message, self.promised_request)
    }
}

#[derive(Debug)]
struct StreamEntry<H> {
    info: StreamInfo,
    /// `None` until the head arrives, on a promised stream or after an
    /// interim response.
    message: Option<HttpMessage<H>>,
    promised_request: Option<Request>,
}

/// Messages under assembly on one connection, keyed by stream id.
#[derive(Debug)]
pub struct InboundStreams<H> {
    streams: HashMap<u32, StreamEntry<H>>,
}

impl<H: Http2Head> InboundStreams<H> {
    pub fn new() -> Self {
        Self { streams: HashMap::new() }
    }

    /// Number of open streams.
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn contains(&self, stream_id: u32) -> bool {
        self.streams.contains_key(&stream_id)
    }

    /// Feeds one decoded frame, returning the message it completes.
    ///
    /// Frames without a per-stream message meaning are ignored.
    pub fn on_frame(&mut self, frame: Frame) -> Result<Option<StreamMessage<H>>, Http2Error> {
        match frame {
            Frame::Headers(frame) => self.on_headers(frame.stream_id, &frame.headers, frame.priority, frame.end_stream),
            Frame::Data(frame) => {
                let (_, delivered) = self.on_data(frame.stream_id, &frame.data, frame.padding, frame.end_stream)?;
                Ok(delivered)
            }
            Frame::PushPromise(frame) => {
                self.on_push_promise(frame.stream_id, frame.promised_id, &frame.headers)?;
                Ok(None)
            }
            Frame::RstStream(frame) => {
                self.on_stream_reset(frame.stream_id);
                Ok(None)
            }
            Frame::Other(_) => Ok(None),
        }
    }

    /// Handles a header block received on `stream_id`.
    ///
    /// # Errors
    ///
    /// A stream `PROTOCOL_ERROR` when the head can't be built from the
    /// pseudo-headers, or when an interim response ends the stream; the
    /// stream is dropped in both cases.
    pub fn on_headers(
        &mut self,
        stream_id: u32,
        headers: &Http2Headers,
        priority: Option<Priority>,
        end_stream: bool,
    ) -> Result<Option<StreamMessage<H>>, Http2Error> {
        let entry = self.streams.entry(stream_id).or_insert_with(|| StreamEntry {
            info: StreamInfo::new(stream_id),
            message: None,
            promised_request: None,
        });
        if let Some(priority) = priority {
            entry.info.set_priority(priority);
        }

        match &mut entry.message {
            Some(message) => {
                trace!(stream_id, fields = headers.fields().len(), "received trailers");
                if !headers.pseudo().is_empty() {
                    debug!(stream_id, "ignoring pseudo-headers in trailers");
                }
                add_fields(headers.fields(), message.trailers_mut());
            }
            None => match to_message::<H>(stream_id, headers) {
                Ok(message) => {
                    debug!(stream_id, start_line = %message.head(), "received message head");
                    let info = entry.info;
                    if message.head().status().is_some_and(|status| status.is_informational()) {
                        if end_stream {
                            warn!(stream_id, "interim response ends the stream, dropping stream");
                            self.streams.remove(&stream_id);
                            return Err(Http2Error::stream(
                                stream_id,
                                ErrorCode::ProtocolError,
                                format!("Interim response with END_STREAM on stream id {stream_id}"),
                            ));
                        }
                        let promised_request = entry.promised_request.clone();
                        return Ok(Some(StreamMessage { info, message, promised_request, interim: true }));
                    }
                    if !end_stream && message.head().method().is_some() && message.expects_continue() {
                        debug!(stream_id, "request expects 100-continue, delivering its head");
                        let head_only =
                            StreamMessage { info, message: message.clone(), promised_request: None, interim: true };
                        entry.message = Some(message);
                        return Ok(Some(head_only));
                    }
                    entry.message = Some(message);
                }
                Err(e) => {
                    warn!(stream_id, cause = %e, "invalid header block, dropping stream");
                    self.streams.remove(&stream_id);
                    return Err(e);
                }
            },
        }

        if end_stream {
            return Ok(self.complete(stream_id));
        }
        Ok(None)
    }

    /// Appends body bytes received on `stream_id`.
    ///
    /// Returns the number of bytes to count against flow control, data and
    /// padding, together with the message this frame completes.
    ///
    /// # Errors
    ///
    /// A connection `PROTOCOL_ERROR` when no message is under assembly on the
    /// stream.
    pub fn on_data(
        &mut self,
        stream_id: u32,
        data: &[u8],
        padding: usize,
        end_stream: bool,
    ) -> Result<(usize, Option<StreamMessage<H>>), Http2Error> {
        let Some(message) = self.streams.get_mut(&stream_id).and_then(|entry| entry.message.as_mut()) else {
            return Err(Http2Error::connection(
                ErrorCode::ProtocolError,
                format!("Data Frame received for unknown stream id {stream_id}"),
            ));
        };

        message.append_body(data);
        trace!(stream_id, len = data.len(), body_size = message.body_len(), "received data");

        let processed = data.len() + padding;
        if end_stream {
            return Ok((processed, self.complete(stream_id)));
        }
        Ok((processed, None))
    }

    /// Reserves `promised_id` for a pushed response.
    ///
    /// # Errors
    ///
    /// A connection `PROTOCOL_ERROR` when the promised stream is already
    /// known, or when this map receives requests; only servers push.
    pub fn on_push_promise(&mut self, stream_id: u32, promised_id: u32, headers: &Http2Headers) -> Result<(), Http2Error> {
        if !H::ACCEPTS_PUSH_PROMISE {
            return Err(Http2Error::connection(
                ErrorCode::ProtocolError,
                format!("Push Promise Frame received from a client on stream id {stream_id}"),
            ));
        }
        if self.streams.contains_key(&promised_id) {
            return Err(Http2Error::connection(
                ErrorCode::ProtocolError,
                format!("Push Promise Frame received for pre-existing stream id {promised_id}"),
            ));
        }

        let request: Request = to_message(promised_id, headers)?;
        debug!(stream_id, promised_id, start_line = %request.head(), "received push promise");
        self.streams.insert(promised_id, StreamEntry {
            info: StreamInfo::promised(promised_id, stream_id),
            message: None,
            promised_request: Some(request),
        });
        Ok(())
    }

    /// Drops whatever was assembled on a reset or closed stream.
    ///
    /// Returns true if the stream was known.
    pub fn on_stream_reset(&mut self, stream_id: u32) -> bool {
        let removed = self.streams.remove(&stream_id).is_some();
        if removed {
            debug!(stream_id, "stream reset, dropping partial message");
        }
        removed
    }

    fn complete(&mut self, stream_id: u32) -> Option<StreamMessage<H>> {
        let entry = self.streams.remove(&stream_id)?;
        let mut message = entry.message?;

        if message.body_len() == 0 && message.head().omits_empty_content_length() {
            message.headers_mut().remove(CONTENT_LENGTH);
        } else {
            message.sync_content_length();
        }

        trace!(stream_id, body_size = message.body_len(), "stream complete");
        Some(StreamMessage { info: entry.info, message, promised_request: entry.promised_request, interim: false })
    }
}

impl<H: Http2Head> Default for InboundStreams<H> {
    fn default() -> Self {
        Self::new()
    }
}
