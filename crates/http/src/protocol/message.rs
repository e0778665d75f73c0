use std::borrow::Cow;

use bytes::{Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, EXPECT, TRANSFER_ENCODING};

use crate::protocol::content_coding::decode_body;
use crate::protocol::{ContentCoding, ContentCodingError, HeaderFields, ParseError, RequestHead, ResponseHead};
use crate::utils::contains_ignore_ascii_case;

/// A structured HTTP message: head, header fields, body and trailers.
///
/// The head type parameter fixes which half of an exchange this is. Trailers
/// (fields sent after a chunked body, or a trailing HTTP/2 HEADERS frame) are
/// always kept apart from the regular header fields.
///
/// A message produced by a decoder may carry a `defect` describing why it is
/// not complete, for example when the peer closed the connection before the
/// whole body arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage<H> {
    head: H,
    headers: HeaderFields,
    body: BytesMut,
    trailers: HeaderFields,
    content_codings: Vec<ContentCoding>,
    defect: Option<ParseError>,
}

pub type Request = HttpMessage<RequestHead>;
pub type Response = HttpMessage<ResponseHead>;

impl<H> HttpMessage<H> {
    pub fn new(head: H) -> Self {
        Self::from_parts(head, HeaderFields::new())
    }

    pub fn from_parts(head: H, headers: HeaderFields) -> Self {
        Self {
            head,
            headers,
            body: BytesMut::new(),
            trailers: HeaderFields::new(),
            content_codings: Vec::new(),
            defect: None,
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.body.clear();
        self.body.extend_from_slice(body.as_ref());
        self
    }

    pub fn head(&self) -> &H {
        &self.head
    }

    pub fn head_mut(&mut self) -> &mut H {
        &mut self.head
    }

    pub fn headers(&self) -> &HeaderFields {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderFields {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BytesMut {
        &mut self.body
    }

    pub fn append_body(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// Actual number of body bytes, independent of any `Content-Length`.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    pub fn trailers(&self) -> &HeaderFields {
        &self.trailers
    }

    pub fn trailers_mut(&mut self) -> &mut HeaderFields {
        &mut self.trailers
    }

    pub fn defect(&self) -> Option<&ParseError> {
        self.defect.as_ref()
    }

    pub fn set_defect(&mut self, defect: ParseError) {
        self.defect = Some(defect);
    }

    /// Returns true when no defect was recorded while building the message.
    pub fn is_complete(&self) -> bool {
        self.defect.is_none()
    }

    /// The declared `Content-Length`, taken from the last such field.
    ///
    /// Returns `None` when the field is absent or its value is not a
    /// non-negative integer.
    pub fn content_length(&self) -> Option<u64> {
        self.headers.last(CONTENT_LENGTH).and_then(|value| value.trim().parse().ok())
    }

    /// Returns true if any `Transfer-Encoding` field mentions `chunked`.
    pub fn is_chunked(&self) -> bool {
        self.headers.get_all(TRANSFER_ENCODING).any(|value| contains_ignore_ascii_case(value, "chunked"))
    }

    /// Makes `Content-Length` match the body.
    ///
    /// Leaves the fields untouched when they already hold exactly one field
    /// with the right value.
    pub fn sync_content_length(&mut self) {
        let len = self.body.len().to_string();
        let in_sync = {
            let mut values = self.headers.get_all(CONTENT_LENGTH);
            matches!((values.next(), values.next()), (Some(value), None) if value.trim() == len)
        };
        if !in_sync {
            self.headers.set("Content-Length", len);
        }
    }

    /// The codings named by `Content-Encoding` when the head was decoded, in
    /// the order they were applied. Empty for an unencoded body.
    pub fn content_codings(&self) -> &[ContentCoding] {
        &self.content_codings
    }

    pub fn set_content_codings(&mut self, codings: Vec<ContentCoding>) {
        self.content_codings = codings;
    }

    /// Reads the content codings again from the current header fields.
    pub fn record_content_codings(&mut self) {
        self.content_codings = ContentCoding::from_headers(&self.headers);
    }

    /// The body with its recorded content codings undone.
    ///
    /// Borrows the body when nothing has to be undone.
    ///
    /// # Errors
    ///
    /// Fails on a coding this crate doesn't know, or on a body that isn't
    /// valid for one of its codings.
    pub fn decoded_body(&self) -> Result<Cow<'_, [u8]>, ContentCodingError> {
        decode_body(&self.content_codings, &self.body)
    }

    /// Returns true if the sender waits for `100 Continue` before sending the
    /// body.
    pub fn expects_continue(&self) -> bool {
        self.headers.get_all(EXPECT).any(|value| value.trim().eq_ignore_ascii_case("100-continue"))
    }

    pub fn into_parts(self) -> (H, HeaderFields, Bytes, HeaderFields) {
        (self.head, self.headers, self.body.freeze(), self.trailers)
    }
}

/// An item produced by [`MessageDecoder`](crate::codec::MessageDecoder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<H> {
    /// A complete message, or one with a premature closure defect.
    Message(HttpMessage<H>),
    /// A message whose head or chunk framing could not be parsed.
    Malformed(MalformedMessage<H>),
    /// Opaque bytes received after the connection switched protocols.
    Tunnel(Bytes),
}

impl<H> Decoded<H> {
    pub fn is_message(&self) -> bool {
        matches!(self, Decoded::Message(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Decoded::Malformed(_))
    }

    pub fn is_tunnel(&self) -> bool {
        matches!(self, Decoded::Tunnel(_))
    }

    pub fn into_message(self) -> Option<HttpMessage<H>> {
        match self {
            Decoded::Message(message) => Some(message),
            Decoded::Malformed(_) | Decoded::Tunnel(_) => None,
        }
    }

    pub fn into_malformed(self) -> Option<MalformedMessage<H>> {
        match self {
            Decoded::Malformed(malformed) => Some(malformed),
            Decoded::Message(_) | Decoded::Tunnel(_) => None,
        }
    }
}

/// A message that failed to decode.
///
/// When the head was parsed before the failure, `partial` holds the message
/// built so far. Otherwise `raw` holds the bytes that could not be parsed as a
/// head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedMessage<H> {
    error: ParseError,
    partial: Option<HttpMessage<H>>,
    raw: Bytes,
}

impl<H> MalformedMessage<H> {
    pub(crate) fn from_raw(error: ParseError, raw: Bytes) -> Self {
        Self { error, partial: None, raw }
    }

    pub(crate) fn from_partial(error: ParseError, partial: HttpMessage<H>) -> Self {
        Self { error, partial: Some(partial), raw: Bytes::new() }
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }

    pub fn partial(&self) -> Option<&HttpMessage<H>> {
        self.partial.as_ref()
    }

    pub fn into_partial(self) -> Option<HttpMessage<H>> {
        self.partial
    }

    pub fn raw(&self) -> &Bytes {
        &self.raw
    }
}

/// Represents an item in a decoded payload stream.
///
/// Body decoders produce data chunks and finally `Eof`, which carries the
/// trailer fields found after a chunked body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem {
    /// A chunk of payload data
    Chunk(Bytes),
    /// Marks the end of the payload stream
    Eof(HeaderFields),
}

impl PayloadItem {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof(_))
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }

    /// Returns a reference to the contained bytes if this is a Chunk
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof(_) => None,
        }
    }
}
