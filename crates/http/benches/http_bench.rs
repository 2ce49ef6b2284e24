use bytes::BytesMut;
use criterion::{criterion_group, criterion_main, Criterion};
use futures::executor::block_on;
use http::header::{HeaderValue, CONTENT_TYPE, SET_COOKIE};
use http::StatusCode;
use rush_http::codec::{check_frame, HttpProtocol, RequestDecoder, ResponseEncoder};
use rush_http::connection::HttpConnection;
use rush_http::handler::make_handler;
use rush_http::protocol::{HttpResponse, ServerParams, ServerRequest};
use std::convert::Infallible;
use std::hint::black_box;
use std::{
    io,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio_util::codec::{Decoder, Encoder};

const SIMPLE_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

const FORM_REQUEST: &[u8] = b"POST /login?next=%2Fhome HTTP/1.1\r\nHost: localhost\r\nCookie: sid=abc; theme=dark\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: 28\r\n\r\nuser=zava&pass=secret&keep=1";

// Mock IO for testing
#[derive(Clone)]
struct MockIO {
    read_data: Vec<u8>,
    write_data: Vec<u8>,
    read_pos: usize,
}

impl MockIO {
    fn new(read_data: Vec<u8>) -> Self {
        Self { read_data, write_data: Vec::new(), read_pos: 0 }
    }
}

impl AsyncRead for MockIO {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut ReadBuf<'_>) -> Poll<io::Result<()>> {
        let remaining = &self.read_data[self.read_pos..];
        let amt = std::cmp::min(remaining.len(), buf.remaining());
        buf.put_slice(&remaining[..amt]);
        self.read_pos += amt;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockIO {
    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<Result<usize, io::Error>> {
        self.write_data.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        Poll::Ready(Ok(()))
    }
}

async fn hello(_req: ServerRequest) -> Result<HttpResponse, Infallible> {
    Ok(HttpResponse::ok().with_body("Hello World!"))
}

fn bench_check_frame(c: &mut Criterion) {
    c.bench_function("check_simple_frame", |b| {
        b.iter(|| black_box(check_frame(black_box(SIMPLE_REQUEST)).unwrap()));
    });

    c.bench_function("check_form_frame", |b| {
        b.iter(|| black_box(check_frame(black_box(FORM_REQUEST)).unwrap()));
    });
}

fn bench_request_decoder(c: &mut Criterion) {
    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::new();
            let mut bytes = BytesMut::from(SIMPLE_REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });

    let protocol = HttpProtocol::new();
    c.bench_function("decode_form_request", |b| {
        b.iter(|| black_box(protocol.decode_frame(bytes::Bytes::from_static(FORM_REQUEST), ServerParams::new())));
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let response = HttpResponse::new(StatusCode::OK)
        .with_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
        .with_header(SET_COOKIE, HeaderValue::from_static("sid=abc"))
        .with_body("Hello World!");

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            encoder.encode(&response, &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let handler = Arc::new(make_handler(hello));

    c.bench_function("process_simple_request", |b| {
        b.iter(|| {
            let mock_io = MockIO::new(SIMPLE_REQUEST.to_vec());
            let (reader, writer) = (mock_io.clone(), mock_io);
            let connection = HttpConnection::new(reader, writer);
            block_on(connection.process(handler.clone())).unwrap();
        });
    });
}

criterion_group!(benches, bench_check_frame, bench_request_decoder, bench_response_encoder, bench_http_connection);
criterion_main!(benches);
