//! HTTP/1 message decoder module
//!
//! This module turns an arbitrarily chunked byte stream into complete
//! [`HttpMessage`]s. It is a [`Decoder`], so it can be driven by hand or by
//! `tokio_util::codec::FramedRead`; [`Decoder::decode_eof`] is the
//! connection-close path.
//!
//! # State Machine
//!
//! - `ReadHead`: waiting for a complete head
//! - `Content`: reading a body, with the message built so far and the
//!   [`PayloadDecoder`] for its framing
//! - `BadMessage`: a head or chunk framing error was reported, all further
//!   input is discarded until [`MessageDecoder::reset`]
//! - `Upgraded`: the connection switched protocols, input is passed through
//!   as [`Decoded::Tunnel`]
//!
//! The decoder never blocks. When the input runs out it returns `None`, keeps
//! its state, and resumes exactly where it stopped on the next call.
//!
//! # Example
//!
//! ```
//! use intercept_http::codec::RequestDecoder;
//! use intercept_http::protocol::Decoded;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET /x HTTP/1.1\r\nHost: a\r\n\r\n");
//!
//! let Some(Decoded::Message(request)) = decoder.decode(&mut buffer).unwrap() else {
//!     panic!("expected a request");
//! };
//! assert_eq!(request.head().target(), "/x");
//! assert_eq!(request.headers().get("host"), Some("a"));
//! ```

use std::collections::VecDeque;
use std::mem;

use bytes::BytesMut;
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING, UPGRADE};
use http::{Method, StatusCode};
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

use crate::codec::body::PayloadDecoder;
use crate::codec::header::{HeaderDecoder, ParsedHead};
use crate::codec::limits::DecoderLimits;
use crate::protocol::{
    Decoded, Head, HttpError, HttpMessage, MalformedMessage, ParseError, PayloadItem, RequestHead, ResponseHead,
};

/// Decoder for requests read from a client connection.
pub type RequestDecoder = MessageDecoder<RequestHead>;

/// Decoder for responses read from a server connection.
pub type ResponseDecoder = MessageDecoder<ResponseHead>;

/// A streaming decoder for one direction of an HTTP/1 connection.
///
/// One instance must be used per connection and direction; it owns the
/// message being built until that message is handed out.
#[derive(Debug)]
pub struct MessageDecoder<H> {
    limits: DecoderLimits,
    header_decoder: HeaderDecoder<H>,
    state: State<H>,
    /// Methods of the requests whose responses are still expected, oldest first.
    request_methods: VecDeque<Method>,
}

#[derive(Debug)]
enum State<H> {
    ReadHead,
    Content { message: HttpMessage<H>, payload: PayloadDecoder },
    BadMessage,
    Upgraded,
}

/// How the body of a freshly parsed message is delimited.
enum Framing {
    /// No body, the message is complete now.
    Empty,
    /// No body, and the bytes after this message belong to another protocol.
    Tunnel,
    Body(PayloadDecoder),
}

impl<H: Head> MessageDecoder<H> {
    /// Creates a new decoder with the default [`DecoderLimits`].
    pub fn new() -> Self {
        Self::with_limits(DecoderLimits::default())
    }

    pub fn with_limits(limits: DecoderLimits) -> Self {
        Self {
            limits,
            header_decoder: HeaderDecoder::new(limits.max_header_bytes()),
            state: State::ReadHead,
            request_methods: VecDeque::new(),
        }
    }

    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// Drops any partial message and starts over with the next head.
    ///
    /// This is the way out of the discarding state entered after a malformed
    /// message. Recorded request methods are forgotten as well.
    pub fn reset(&mut self) {
        self.state = State::ReadHead;
        self.header_decoder.reset();
        self.request_methods.clear();
    }

    /// Returns true while input is discarded after a malformed message.
    pub fn is_discarding(&self) -> bool {
        matches!(self.state, State::BadMessage)
    }

    /// Returns true once the connection switched to another protocol.
    pub fn is_upgraded(&self) -> bool {
        matches!(self.state, State::Upgraded)
    }

    /// Decides how the body of `message` is delimited.
    fn framing(&mut self, message: &HttpMessage<H>) -> Result<Framing, ParseError> {
        let limits = &self.limits;

        if let Some(status) = message.head().status() {
            // interim responses share the request of the final response that follows
            let method = if status.is_informational() && status != StatusCode::SWITCHING_PROTOCOLS {
                self.request_methods.front().cloned()
            } else {
                self.request_methods.pop_front()
            };

            if method.as_ref() == Some(&Method::CONNECT) && status.is_success() {
                return Ok(Framing::Tunnel);
            }
            if status == StatusCode::SWITCHING_PROTOCOLS && switches_away_from_http1(message) {
                return Ok(Framing::Tunnel);
            }
            if status.is_informational()
                || status == StatusCode::NO_CONTENT
                || status == StatusCode::NOT_MODIFIED
                || method.as_ref() == Some(&Method::HEAD)
            {
                return Ok(Framing::Empty);
            }
        }

        if message.is_chunked() {
            return Ok(Framing::Body(PayloadDecoder::chunked(limits)));
        }

        let is_request = message.head().method().is_some();
        match message.headers().last(CONTENT_LENGTH) {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => Ok(Framing::Empty),
                Ok(length) => Ok(Framing::Body(PayloadDecoder::fix_length(length, limits))),
                Err(_) if is_request => Err(ParseError::invalid_content_length(format!("value {value} is not u64"))),
                Err(_) => {
                    debug!(content_length = value, "ignoring invalid content-length, reading until close");
                    Ok(Framing::Body(PayloadDecoder::until_close(limits)))
                }
            },
            // a request without framing fields has no body
            None if is_request => Ok(Framing::Empty),
            None => Ok(Framing::Body(PayloadDecoder::until_close(limits))),
        }
    }

    fn malformed(&mut self, malformed: MalformedMessage<H>) -> Option<Decoded<H>> {
        warn!(cause = %malformed.error(), "malformed message, discarding further input");
        self.state = State::BadMessage;
        Some(Decoded::Malformed(malformed))
    }
}

impl MessageDecoder<ResponseHead> {
    /// Records the method of a request sent on this connection.
    ///
    /// Responses are matched to requests in order. The method decides whether
    /// a response can have a body (`HEAD`) and whether a successful response
    /// turns the connection into a tunnel (`CONNECT`). Responses without a
    /// recorded method are treated as answers to `GET`.
    pub fn expect_response_to(&mut self, method: Method) {
        self.request_methods.push_back(method);
    }

    /// Number of requests still waiting for their final response.
    pub fn pending_requests(&self) -> usize {
        self.request_methods.len()
    }
}

impl<H: Head> Default for MessageDecoder<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Head> Decoder for MessageDecoder<H> {
    type Item = Decoded<H>;
    type Error = HttpError;

    /// Attempts to decode the next message from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Decoded::Message(_)))`: a complete message
    /// - `Ok(Some(Decoded::Malformed(_)))`: a message that failed to parse; the
    ///   decoder discards input until reset
    /// - `Ok(Some(Decoded::Tunnel(_)))`: bytes received after a protocol switch
    /// - `Ok(None)`: need more data to proceed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match mem::replace(&mut self.state, State::ReadHead) {
                State::ReadHead => {
                    let (head, headers) = match self.header_decoder.decode(src)? {
                        Some(ParsedHead::Complete(head, headers)) => (head, headers),
                        Some(ParsedHead::Malformed(error, raw)) => {
                            return Ok(self.malformed(MalformedMessage::from_raw(error, raw)));
                        }
                        None => return Ok(None),
                    };

                    debug!(start_line = %head, fields = headers.len(), "decoded message head");
                    let mut message = HttpMessage::from_parts(head, headers);
                    message.record_content_codings();

                    match self.framing(&message) {
                        Ok(Framing::Empty) => return Ok(Some(Decoded::Message(message))),
                        Ok(Framing::Tunnel) => {
                            debug!("connection switched protocols, passing bytes through");
                            self.state = State::Upgraded;
                            return Ok(Some(Decoded::Message(message)));
                        }
                        Ok(Framing::Body(payload)) => {
                            trace!(?payload, "reading message body");
                            self.state = State::Content { message, payload };
                        }
                        Err(error) => return Ok(self.malformed(MalformedMessage::from_partial(error, message))),
                    }
                }

                State::Content { mut message, mut payload } => match payload.decode(src) {
                    Ok(Some(PayloadItem::Chunk(bytes))) => {
                        message.append_body(&bytes);
                        self.state = State::Content { message, payload };
                    }
                    Ok(Some(PayloadItem::Eof(trailers))) => {
                        if payload.is_chunked() {
                            message.headers_mut().remove(TRANSFER_ENCODING);
                            *message.trailers_mut() = trailers;
                        }
                        message.sync_content_length();
                        trace!(body_size = message.body_len(), "finished reading message body");
                        return Ok(Some(Decoded::Message(message)));
                    }
                    Ok(None) => {
                        self.state = State::Content { message, payload };
                        return Ok(None);
                    }
                    Err(HttpError::Parse { source }) => {
                        return Ok(self.malformed(MalformedMessage::from_partial(source, message)));
                    }
                    Err(e) => {
                        self.state = State::BadMessage;
                        return Err(e);
                    }
                },

                State::BadMessage => {
                    if !src.is_empty() {
                        trace!(len = src.len(), "discarding bytes after malformed message");
                        src.clear();
                    }
                    self.state = State::BadMessage;
                    return Ok(None);
                }

                State::Upgraded => {
                    self.state = State::Upgraded;
                    if src.is_empty() {
                        return Ok(None);
                    }
                    return Ok(Some(Decoded::Tunnel(src.split().freeze())));
                }
            }
        }
    }

    /// Finishes decoding when the connection closes.
    ///
    /// - nothing buffered: nothing is emitted
    /// - a partial head: a [`Decoded::Malformed`] with
    ///   [`ParseError::IncompleteHeader`] and the raw bytes
    /// - a body delimited by close: the message, complete
    /// - any other unfinished body: the message with the bytes received so
    ///   far, flagged with [`ParseError::IncompleteBody`]
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        match mem::replace(&mut self.state, State::ReadHead) {
            State::ReadHead => {
                if src.is_empty() {
                    return Ok(None);
                }
                self.header_decoder.reset();
                debug!(len = src.len(), "connection closed before the full head was received");
                let raw = src.split().freeze();
                Ok(Some(Decoded::Malformed(MalformedMessage::from_raw(ParseError::IncompleteHeader, raw))))
            }
            State::Content { mut message, payload } => {
                if payload.is_until_close() {
                    message.sync_content_length();
                    trace!(body_size = message.body_len(), "body ended by connection close");
                } else {
                    debug!(body_size = message.body_len(), "connection closed before the full body was received");
                    message.set_defect(ParseError::IncompleteBody);
                    src.clear();
                }
                Ok(Some(Decoded::Message(message)))
            }
            state @ (State::BadMessage | State::Upgraded) => {
                self.state = state;
                Ok(None)
            }
        }
    }
}

/// A `101` whose `Upgrade` field names something other than HTTP/1.
fn switches_away_from_http1<H>(message: &HttpMessage<H>) -> bool {
    message.headers().get(UPGRADE).is_some_and(|protocol| !protocol.contains("HTTP/1.0") && !protocol.contains("HTTP/1.1"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::protocol::{ContentCoding, Request, Response};
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use http::Version;
    use indoc::indoc;

    fn decode_all<H: Head>(decoder: &mut MessageDecoder<H>, buf: &mut BytesMut) -> Vec<Decoded<H>> {
        let mut items = Vec::new();
        while let Some(item) = decoder.decode(buf).unwrap() {
            items.push(item);
        }
        items
    }

    fn message<H: std::fmt::Debug>(item: Option<Decoded<H>>) -> HttpMessage<H> {
        match item {
            Some(Decoded::Message(message)) => message,
            other => panic!("expected a message, got {other:?}"),
        }
    }

    fn malformed<H: std::fmt::Debug>(item: Option<Decoded<H>>) -> MalformedMessage<H> {
        match item {
            Some(Decoded::Malformed(malformed)) => malformed,
            other => panic!("expected a malformed message, got {other:?}"),
        }
    }

    fn decode_request(input: &str) -> Request {
        let mut buf = BytesMut::from(input);
        message(RequestDecoder::new().decode(&mut buf).unwrap())
    }

    #[test]
    fn request_fed_byte_by_byte() {
        let input = b"GET /x HTTP/1.1\r\nHost: a\r\n\r\n";
        assert_eq!(input.len(), 28);

        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::new();
        let mut emitted = Vec::new();

        for byte in input {
            buf.extend_from_slice(&[*byte]);
            emitted.extend(decode_all(&mut decoder, &mut buf));
        }
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());

        assert_eq!(emitted.len(), 1);
        let request = message(emitted.pop());
        assert_eq!(request.head().method(), &Method::GET);
        assert_eq!(request.head().target(), "/x");
        assert_eq!(request.headers().get("Host"), Some("a"));
        assert!(request.body().is_empty());
        assert!(request.is_complete());
    }

    #[test]
    fn fixed_length_body_split_anywhere() {
        let input = b"POST /upload HTTP/1.1\r\nHost: a\r\nContent-Length: 11\r\n\r\nhello world";

        for split in 1..input.len() {
            let mut decoder = RequestDecoder::new();
            let mut buf = BytesMut::from(&input[..split]);
            let mut items = decode_all(&mut decoder, &mut buf);
            buf.extend_from_slice(&input[split..]);
            items.extend(decode_all(&mut decoder, &mut buf));

            assert_eq!(items.len(), 1, "split at {split}");
            let request = message(items.pop());
            assert_eq!(request.body(), b"hello world", "split at {split}");
            assert_eq!(request.headers().len(), 2);
        }
    }

    #[test]
    fn fixed_length_body_respects_step_size() {
        let limits = DecoderLimits::default().with_max_step_bytes(3);
        let mut decoder = RequestDecoder::with_limits(limits);
        let mut buf = BytesMut::from("PUT / HTTP/1.1\r\nContent-Length: 10\r\n\r\n0123456789");

        let request = message(decoder.decode(&mut buf).unwrap());
        assert_eq!(request.body(), b"0123456789");
    }

    #[test]
    fn last_content_length_wins() {
        let request = decode_request("POST / HTTP/1.1\r\nContent-Length: 1\r\nContent-Length: 3\r\n\r\nabc");

        assert_eq!(request.body(), b"abc");
        assert_eq!(request.headers().get_all("content-length").collect::<Vec<_>>(), vec!["3"]);
    }

    #[test]
    fn zero_content_length_completes_immediately() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n");

        let request = message(decoder.decode(&mut buf).unwrap());
        assert!(request.body().is_empty());
        assert_eq!(request.headers().get("Content-Length"), Some("0"));
        assert!(buf.is_empty());
    }

    #[test]
    fn request_without_framing_has_no_body() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("GET /a HTTP/1.1\r\n\r\nGET /b HTTP/1.1\r\n\r\n");

        let items = decode_all(&mut decoder, &mut buf);
        assert_eq!(items.len(), 2);
        let targets: Vec<_> = items.into_iter().filter_map(Decoded::into_message).map(|r| r.head().target().to_owned()).collect();
        assert_eq!(targets, vec!["/a", "/b"]);
    }

    #[test]
    fn chunked_body_is_dechunked() {
        let request = decode_request(indoc! {"
            POST /wiki HTTP/1.1\r
            Host: a\r
            Transfer-Encoding: chunked\r
            \r
            4\r
            Wiki\r
            5\r
            pedia\r
            0\r
            \r
        "});

        assert_eq!(request.body(), b"Wikipedia");
        assert_eq!(request.headers().get("Content-Length"), Some("9"));
        assert!(!request.headers().contains("Transfer-Encoding"));
        assert!(request.trailers().is_empty());
    }

    #[test]
    fn chunked_wins_over_content_length_and_other_codings() {
        let request = decode_request(
            "POST / HTTP/1.1\r\nTransfer-Encoding: gzip\r\nContent-Length: 100\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nAbc\r\n4\r\nwxyz\r\n0\r\n\r\n",
        );

        assert_eq!(request.body(), b"Abcwxyz");
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.headers().get("content-length"), Some("7"));
    }

    #[test]
    fn chunked_with_zero_chunks() {
        let request = decode_request("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\n\r\n");

        assert!(request.body().is_empty());
        assert!(request.trailers().is_empty());
        assert_eq!(request.headers().get("content-length"), Some("0"));
    }

    #[test]
    fn chunked_trailers_are_kept_apart() {
        let request = decode_request("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\nA: b\r\nX: y\r\n\r\n");

        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.trailers().get("a"), Some("b"));
        assert_eq!(request.trailers().get("x"), Some("y"));
    }

    #[test]
    fn invalid_chunk_size_reports_partial_message_and_discards() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nAbc\r\nG\r\nmore bytes");

        let malformed = malformed(decoder.decode(&mut buf).unwrap());
        assert!(matches!(malformed.error(), ParseError::InvalidChunkSize { .. }));
        assert_eq!(malformed.partial().map(HttpMessage::body), Some(&b"Abc"[..]));

        assert!(decoder.is_discarding());
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());

        buf.extend_from_slice(b"GET / HTTP/1.1\r\n\r\n");
        assert!(decoder.decode(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn recovers_after_reset() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nno colon here\r\n\r\n");

        let malformed = malformed(decoder.decode(&mut buf).unwrap());
        assert!(malformed.partial().is_none());
        assert_eq!(&malformed.raw()[..], b"GET / HTTP/1.1\r\nno colon here\r\n\r\n");

        decoder.reset();
        buf.extend_from_slice(b"GET /next HTTP/1.1\r\n\r\n");
        let request = message(decoder.decode(&mut buf).unwrap());
        assert_eq!(request.head().target(), "/next");
    }

    #[test]
    fn invalid_request_content_length_is_malformed() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n0123456789");

        let malformed = malformed(decoder.decode(&mut buf).unwrap());
        assert!(matches!(malformed.error(), ParseError::InvalidContentLength { .. }));
        assert_eq!(malformed.partial().map(|m| m.head().target()), Some("/"));
    }

    #[test]
    fn under_received_body_is_flagged_on_close() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: a\r\nContent-Length: 10\r\n\r\nabc");

        assert!(decoder.decode(&mut buf).unwrap().is_none());

        let request = message(decoder.decode_eof(&mut buf).unwrap());
        assert_eq!(request.body(), b"abc");
        assert_eq!(request.defect(), Some(&ParseError::IncompleteBody));
        assert_eq!(request.headers().get("Content-Length"), Some("10"));

        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn unfinished_chunked_body_is_flagged_on_close() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n3\r\nAbc\r\n4");

        let request = message(decoder.decode_eof(&mut buf).unwrap());
        assert_eq!(request.body(), b"Abc");
        assert_eq!(request.defect(), Some(&ParseError::IncompleteBody));
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn partial_head_on_close() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost:");

        let malformed = malformed(decoder.decode_eof(&mut buf).unwrap());
        assert_eq!(malformed.error(), &ParseError::IncompleteHeader);
        assert_eq!(&malformed.raw()[..], b"GET / HTTP/1.1\r\nHost:");
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn close_without_bytes_emits_nothing() {
        let mut decoder = RequestDecoder::new();
        let mut buf = BytesMut::new();
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());

        let mut buf = BytesMut::from("\r\n");
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn oversized_head_is_malformed() {
        let limits = DecoderLimits::default().with_max_header_bytes(64);
        let mut decoder = RequestDecoder::with_limits(limits);
        let mut buf = BytesMut::from(format!("GET / HTTP/1.1\r\nX-Big: {}\r\n\r\n", "a".repeat(100)).as_str());

        let malformed = malformed(decoder.decode(&mut buf).unwrap());
        assert!(matches!(malformed.error(), ParseError::TooLargeHeader { max_size: 64, .. }));
    }

    fn decode_response(decoder: &mut ResponseDecoder, input: &str) -> Response {
        let mut buf = BytesMut::from(input);
        message(decoder.decode(&mut buf).unwrap())
    }

    #[test]
    fn response_to_head_has_no_body() {
        let mut decoder = ResponseDecoder::new();
        decoder.expect_response_to(Method::HEAD);
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\n");

        let response = message(decoder.decode(&mut buf).unwrap());
        assert!(response.body().is_empty());
        assert_eq!(response.headers().get("Content-Length"), Some("100"));
        assert_eq!(decoder.pending_requests(), 0);
    }

    #[test]
    fn pipelined_head_then_get() {
        let mut decoder = ResponseDecoder::new();
        decoder.expect_response_to(Method::HEAD);
        decoder.expect_response_to(Method::GET);
        let mut buf = BytesMut::from(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\nhello",
        );

        let items = decode_all(&mut decoder, &mut buf);
        let bodies: Vec<_> = items.into_iter().filter_map(Decoded::into_message).map(|m| m.body().to_vec()).collect();
        assert_eq!(bodies, vec![b"".to_vec(), b"hello".to_vec()]);
    }

    #[test]
    fn bodiless_statuses() {
        for status in ["100 Continue", "204 No Content", "304 Not Modified"] {
            let mut decoder = ResponseDecoder::new();
            let response =
                decode_response(&mut decoder, &format!("HTTP/1.1 {status}\r\nContent-Length: 10\r\n\r\n"));
            assert!(response.body().is_empty(), "status {status}");
        }
    }

    #[test]
    fn interim_response_keeps_request_method() {
        let mut decoder = ResponseDecoder::new();
        decoder.expect_response_to(Method::HEAD);

        let interim = decode_response(&mut decoder, "HTTP/1.1 100 Continue\r\n\r\n");
        assert_eq!(interim.head().status(), StatusCode::CONTINUE);
        assert_eq!(decoder.pending_requests(), 1);

        let response = decode_response(&mut decoder, "HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\n");
        assert!(response.body().is_empty());
    }

    #[test]
    fn response_read_until_close() {
        let mut decoder = ResponseDecoder::new();
        let mut buf = BytesMut::from("HTTP/1.0 200 OK\r\nServer: x\r\n\r\npart one, ");

        assert!(decode_all(&mut decoder, &mut buf).is_empty());
        buf.extend_from_slice(b"part two");
        assert!(decode_all(&mut decoder, &mut buf).is_empty());

        let response = message(decoder.decode_eof(&mut buf).unwrap());
        assert_eq!(response.body(), b"part one, part two");
        assert_eq!(response.headers().get("content-length"), Some("18"));
        assert!(response.is_complete());
        assert_eq!(response.head().version(), Version::HTTP_10);
    }

    #[test]
    fn invalid_response_content_length_reads_until_close() {
        let mut decoder = ResponseDecoder::new();
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: x\r\n\r\nabc");

        assert!(decode_all(&mut decoder, &mut buf).is_empty());
        let response = message(decoder.decode_eof(&mut buf).unwrap());
        assert_eq!(response.body(), b"abc");
        assert_eq!(response.headers().get("content-length"), Some("3"));
    }

    #[test]
    fn switching_protocols_upgrades() {
        let mut decoder = ResponseDecoder::new();
        let mut buf = BytesMut::from(&b"HTTP/1.1 101 Switching Protocols\r\nUpgrade: websocket\r\n\r\n\x81\x05hello"[..]);

        let response = message(decoder.decode(&mut buf).unwrap());
        assert_eq!(response.head().status(), StatusCode::SWITCHING_PROTOCOLS);
        assert!(decoder.is_upgraded());

        match decoder.decode(&mut buf).unwrap() {
            Some(Decoded::Tunnel(bytes)) => assert_eq!(&bytes[..], b"\x81\x05hello"),
            other => panic!("expected tunnel bytes, got {other:?}"),
        }
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn switching_to_http1_keeps_decoding() {
        let mut decoder = ResponseDecoder::new();
        let mut buf = BytesMut::from("HTTP/1.1 101 Switching Protocols\r\nUpgrade: HTTP/1.1\r\n\r\n");

        message(decoder.decode(&mut buf).unwrap());
        assert!(!decoder.is_upgraded());
    }

    #[test]
    fn connect_success_becomes_tunnel() {
        let mut decoder = ResponseDecoder::new();
        decoder.expect_response_to(Method::CONNECT);
        let mut buf = BytesMut::from("HTTP/1.1 200 Connection established\r\n\r\n\x16\x03\x01");

        let items = decode_all(&mut decoder, &mut buf);
        assert_eq!(items.len(), 2);
        assert!(items[0].is_message());
        assert_eq!(items[1], Decoded::Tunnel(bytes::Bytes::from_static(b"\x16\x03\x01")));
    }

    #[test]
    fn connect_failure_has_a_body() {
        let mut decoder = ResponseDecoder::new();
        decoder.expect_response_to(Method::CONNECT);

        let response = decode_response(&mut decoder, "HTTP/1.1 502 Bad Gateway\r\nContent-Length: 4\r\n\r\nnope");
        assert_eq!(response.body(), b"nope");
        assert!(!decoder.is_upgraded());
    }

    #[test]
    fn content_codings_are_recorded_with_the_head() {
        let request = decode_request("POST / HTTP/1.1\r\nContent-Encoding: gzip, br\r\nContent-Length: 0\r\n\r\n");
        assert_eq!(request.content_codings(), &[ContentCoding::Gzip, ContentCoding::Brotli]);

        let request = decode_request("POST / HTTP/1.1\r\nContent-Length: 0\r\n\r\n");
        assert!(request.content_codings().is_empty());
    }

    #[test]
    fn gzip_body_is_kept_and_can_be_decoded() {
        let mut gzip = GzEncoder::new(Vec::new(), Compression::fast());
        gzip.write_all(b"hello, compressed world").unwrap();
        let body = gzip.finish().unwrap();

        let mut buf = BytesMut::from(
            format!("HTTP/1.1 200 OK\r\nContent-Encoding: gzip\r\nContent-Length: {}\r\n\r\n", body.len()).as_str(),
        );
        buf.extend_from_slice(&body);
        let response = message(ResponseDecoder::new().decode(&mut buf).unwrap());

        assert_eq!(response.body(), &body[..]);
        assert_eq!(&response.decoded_body().unwrap()[..], b"hello, compressed world");
    }
}
