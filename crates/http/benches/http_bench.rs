use std::hint::black_box;

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use http::{Method, StatusCode, Version};
use intercept_http::codec::{RequestDecoder, ResponseEncoder};
use intercept_http::h2::{FrameDecoder, FrameEncoder, Http2Config, InboundStreams, message_frames, to_http2_headers};
use intercept_http::protocol::{Request, RequestHead, Response, ResponseHead};
use tokio_util::codec::{Decoder, Encoder};

fn sample_request() -> Request {
    let mut request = Request::new(RequestHead::new(Method::POST, "/api/items?id=7", Version::HTTP_11));
    let headers = request.headers_mut();
    headers.append("Host", "example.com");
    headers.append("Content-Type", "application/json");
    headers.append("Cookie", "session=abc; theme=dark; consent=1");
    headers.append("Connection", "keep-alive");
    request.append_body(br#"{"name":"widget","count":3}"#);
    request
}

fn bench_request_decoder(c: &mut Criterion) {
    let request = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(&request[..]);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let mut response = Response::new(ResponseHead::new(Version::HTTP_11, StatusCode::OK)).with_body("Hello World!");
    response.headers_mut().append("Content-Type", "text/plain");
    response.sync_content_length();

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode(&response, &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_http2_translation(c: &mut Criterion) {
    let config = Http2Config::default();
    let request = sample_request();

    c.bench_function("request_to_http2_headers", |b| {
        b.iter(|| black_box(to_http2_headers(&request, &config)));
    });

    c.bench_function("http2_stream_round_trip", |b| {
        b.iter(|| {
            let mut wire = BytesMut::new();
            let mut encoder = FrameEncoder::new(&config);
            for frame in message_frames(1, &request, &config) {
                encoder.encode(frame, &mut wire).unwrap();
            }

            let mut decoder = FrameDecoder::new(&config);
            let mut streams = InboundStreams::<RequestHead>::new();
            while let Some(frame) = decoder.decode(&mut wire).unwrap() {
                if let Some(delivered) = streams.on_frame(frame).unwrap() {
                    black_box(delivered);
                }
            }
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_response_encoder, bench_http2_translation);
criterion_main!(benches);
