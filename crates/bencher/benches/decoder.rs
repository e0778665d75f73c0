use std::hint::black_box;

use bencher::{CHUNKED_RESPONSE, GET_LARGE, GET_SMALL, POST_PIPELINED, TestCase};
use criterion::{BatchSize, BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use intercept_http::codec::{RequestDecoder, ResponseDecoder};
use tokio_util::bytes::BytesMut;
use tokio_util::codec::Decoder;

fn request_cases() -> Vec<TestCase> {
    vec![
        TestCase::small("small_header_decoder", GET_SMALL),
        TestCase::large("large_header_decoder", GET_LARGE),
        TestCase::large("pipelined_body_decoder", POST_PIPELINED),
    ]
}

fn benchmark_request_decoder(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("request_decoder");

    for case in request_cases() {
        group.throughput(Throughput::Bytes(case.wire().len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(case.name()), &case, |b, case| {
            let mut request_decoder = RequestDecoder::new();
            b.iter_batched_ref(
                || BytesMut::from(case.wire()),
                |bytes_mut| {
                    for _ in 0..case.fixture().messages() {
                        let request = request_decoder.decode(bytes_mut).expect("input should be a valid request stream");
                        black_box(request.expect("input should hold a complete request"));
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

fn benchmark_response_decoder(criterion: &mut Criterion) {
    let case = TestCase::large("chunked_response_decoder", CHUNKED_RESPONSE);
    let mut group = criterion.benchmark_group("response_decoder");
    group.throughput(Throughput::Bytes(case.wire().len() as u64));

    group.bench_function(BenchmarkId::from_parameter(case.name()), |b| {
        let mut response_decoder = ResponseDecoder::new();
        b.iter_batched_ref(
            || BytesMut::from(case.wire()),
            |bytes_mut| {
                let response = response_decoder.decode(bytes_mut).expect("input should be a valid response");
                black_box(response.expect("input should hold a complete response"));
            },
            BatchSize::SmallInput,
        );
    });

    group.finish();
}

criterion_group!(decoder, benchmark_request_decoder, benchmark_response_decoder);
criterion_main!(decoder);
