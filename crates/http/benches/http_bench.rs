use std::hint::black_box;

use bytes::{Bytes, BytesMut};
use criterion::{Criterion, criterion_group, criterion_main};
use http::StatusCode;
use pull_http::buffer::GrowableBuffer;
use pull_http::codec::{HeaderDecoder, ResponseEncoder};
use pull_http::connection::HttpConnection;
use pull_http::handler::make_handler;
use pull_http::protocol::{ConnectionError, HeaderLines, Message, PayloadItem, PayloadSize, Request, Response, ResponseHead};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::runtime::Runtime;
use tokio_util::codec::Encoder;

const SIMPLE_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

const CURL_REQUEST: &[u8] = b"GET /index.html?q=1 HTTP/1.1\r\n\
Host: 127.0.0.1:8080\r\n\
User-Agent: curl/7.79.1\r\n\
Accept: */*\r\n\
Accept-Encoding: gzip, deflate\r\n\
Connection: keep-alive\r\n\r\n";

async fn hello_world(_req: Request) -> Result<Response, ConnectionError> {
    Ok(Response::new(StatusCode::OK, "Hello World!"))
}

fn bench_header_decoder(c: &mut Criterion) {
    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut buffer = GrowableBuffer::new();
            buffer.append(SIMPLE_REQUEST);
            black_box(HeaderDecoder.decode(&mut buffer).unwrap());
        });
    });

    c.bench_function("decode_curl_request", |b| {
        b.iter(|| {
            let mut buffer = GrowableBuffer::new();
            buffer.append(CURL_REQUEST);
            black_box(HeaderDecoder.decode(&mut buffer).unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let body = Bytes::from_static(b"Hello World!");

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut dst = BytesMut::new();

            let mut headers = HeaderLines::new();
            headers.append("Server", "pull-http");
            let head = ResponseHead::new(StatusCode::OK, headers);

            encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Length(body.len() as u64))), &mut dst).unwrap();
            encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Chunk(body.clone())), &mut dst).unwrap();
            encoder.encode(Message::<(ResponseHead, PayloadSize), Bytes>::Payload(PayloadItem::Eof), &mut dst).unwrap();
            black_box(dst);
        });
    });
}

fn bench_http_connection(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let handler = make_handler(hello_world);

    c.bench_function("process_simple_request", |b| {
        b.to_async(&runtime).iter(|| async {
            let (mut client, server) = tokio::io::duplex(16 * 1024);
            let (reader, writer) = tokio::io::split(server);

            client.write_all(SIMPLE_REQUEST).await.unwrap();
            client.shutdown().await.unwrap();

            HttpConnection::new(reader, writer).process(&handler).await.unwrap();

            let mut output = Vec::new();
            client.read_to_end(&mut output).await.unwrap();
            black_box(output);
        });
    });
}

criterion_group!(benches, bench_header_decoder, bench_response_encoder, bench_http_connection);
criterion_main!(benches);
