//! HTTP/1 message encoder module
//!
//! Serializes a whole [`HttpMessage`] back to wire bytes: the head through
//! [`HeaderEncoder`], then the body. The message is only borrowed, so a
//! consumer can forward a decoded message and keep inspecting it.
//!
//! Without trailers, framing fields are written as they stand and the body
//! follows as it is. A decoded message already carries a `Content-Length`
//! that matches its body; a message built by hand should call
//! [`HttpMessage::sync_content_length`] first. With trailers, the body is sent
//! as one chunk followed by the trailer section, so decoding the output gives
//! back the same message.

use std::marker::PhantomData;

use bytes::{BufMut, Bytes, BytesMut};
use tokio_util::codec::Encoder;
use tracing::trace;

use crate::codec::body::ChunkedEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Head, HttpMessage, PayloadItem, RequestHead, ResponseHead, SendError};

pub type RequestEncoder = MessageEncoder<RequestHead>;

pub type ResponseEncoder = MessageEncoder<ResponseHead>;

#[derive(Debug)]
pub struct MessageEncoder<H> {
    header_encoder: HeaderEncoder,
    _head: PhantomData<fn(H)>,
}

impl<H: Head> MessageEncoder<H> {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<H: Head> Default for MessageEncoder<H> {
    fn default() -> Self {
        Self { header_encoder: HeaderEncoder, _head: PhantomData }
    }
}

impl<H: Head> Encoder<&HttpMessage<H>> for MessageEncoder<H> {
    type Error = SendError;

    fn encode(&mut self, item: &HttpMessage<H>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        self.header_encoder.encode(item, dst)?;

        if item.trailers().is_empty() {
            dst.reserve(item.body_len());
            dst.put_slice(item.body());
        } else {
            let mut chunked = ChunkedEncoder::new();
            chunked.encode(PayloadItem::Chunk(Bytes::copy_from_slice(item.body())), dst)?;
            chunked.encode(PayloadItem::Eof(item.trailers().clone()), dst)?;
        }
        trace!(start_line = %item.head(), body_size = item.body_len(), trailers = item.trailers().len(), "encoded message");
        Ok(())
    }
}

impl<H: Head> Encoder<HttpMessage<H>> for MessageEncoder<H> {
    type Error = SendError;

    fn encode(&mut self, item: HttpMessage<H>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        Encoder::<&HttpMessage<H>>::encode(self, &item, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::RequestDecoder;
    use crate::protocol::{Decoded, Request, Response};
    use http::{Method, StatusCode, Version};
    use indoc::indoc;
    use tokio_util::codec::Decoder;

    #[test]
    fn encodes_response_with_body() {
        let head = ResponseHead::new(Version::HTTP_11, StatusCode::OK).with_reason("OK");
        let mut response = Response::new(head).with_body("hello");
        response.headers_mut().append("Server", "x");
        response.sync_content_length();

        let mut dst = BytesMut::new();
        ResponseEncoder::new().encode(&response, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nServer: x\r\nContent-Length: 5\r\n\r\nhello");
        assert_eq!(response.body(), b"hello");
    }

    #[test]
    fn response_without_reason_keeps_the_space() {
        let response = Response::new(ResponseHead::new(Version::HTTP_11, StatusCode::NO_CONTENT));

        let mut dst = BytesMut::new();
        ResponseEncoder::new().encode(response, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 204 \r\n\r\n");
    }

    #[test]
    fn unwritable_version_is_rejected() {
        let request = Request::new(RequestHead::new(Method::GET, "/", Version::HTTP_3));

        let mut dst = BytesMut::new();
        let result = RequestEncoder::new().encode(&request, &mut dst);

        assert!(matches!(result, Err(SendError::InvalidHead { .. })));
    }

    #[test]
    fn decoded_chunked_request_without_trailers_encodes_with_length() {
        let mut buf = BytesMut::from(indoc! {"
            POST /submit HTTP/1.1\r
            Host: example.com\r
            Transfer-Encoding: chunked\r
            \r
            4\r
            Wiki\r
            5\r
            pedia\r
            0\r
            \r
        "});
        let Some(Decoded::Message(request)) = RequestDecoder::new().decode(&mut buf).unwrap() else {
            panic!("expected a request");
        };

        let mut dst = BytesMut::new();
        RequestEncoder::new().encode(&request, &mut dst).unwrap();

        let expected = indoc! {"
            POST /submit HTTP/1.1\r
            Host: example.com\r
            Content-Length: 9\r
            \r
            Wikipedia"};
        assert_eq!(&dst[..], expected.as_bytes());
    }

    #[test]
    fn trailers_are_sent_after_a_chunked_body() {
        let mut buf = BytesMut::from(indoc! {"
            POST /submit HTTP/1.1\r
            Host: example.com\r
            Transfer-Encoding: chunked\r
            \r
            4\r
            Wiki\r
            5\r
            pedia\r
            0\r
            Checksum: 1\r
            \r
        "});
        let mut decoder = RequestDecoder::new();
        let first = decoder.decode(&mut buf).unwrap().and_then(Decoded::into_message).unwrap();

        let mut encoded = BytesMut::new();
        RequestEncoder::new().encode(&first, &mut encoded).unwrap();

        let expected = indoc! {"
            POST /submit HTTP/1.1\r
            Host: example.com\r
            Transfer-Encoding: chunked\r
            \r
            9\r
            Wikipedia\r
            0\r
            Checksum: 1\r
            \r
        "};
        assert_eq!(&encoded[..], expected.as_bytes());

        let second = decoder.decode(&mut encoded).unwrap().and_then(Decoded::into_message).unwrap();
        assert_eq!(second.trailers().get("checksum"), Some("1"));
        assert_eq!(second.body(), first.body());
        assert_eq!(second.headers(), first.headers());
    }

    #[test]
    fn empty_body_with_trailers_is_only_the_last_chunk() {
        let mut response = Response::new(ResponseHead::new(Version::HTTP_11, StatusCode::OK).with_reason("OK"));
        response.trailers_mut().append("grpc-status", "0");

        let mut dst = BytesMut::new();
        ResponseEncoder::new().encode(&response, &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n0\r\ngrpc-status: 0\r\n\r\n");
    }

    #[test]
    fn decode_encode_is_a_fixed_point() {
        let input = "PUT /a?b=c HTTP/1.1\r\nHost: h\r\nX-Case: MiXeD\r\nContent-Length: 4\r\n\r\nbody";
        let mut buf = BytesMut::from(input);
        let mut decoder = RequestDecoder::new();
        let first = decoder.decode(&mut buf).unwrap().and_then(Decoded::into_message).unwrap();

        let mut encoded = BytesMut::new();
        RequestEncoder::new().encode(&first, &mut encoded).unwrap();
        assert_eq!(&encoded[..], input.as_bytes());

        let second = decoder.decode(&mut encoded).unwrap().and_then(Decoded::into_message).unwrap();
        assert_eq!(first, second);
    }
}
