use std::fmt;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Encoder;
use tracing::{debug, error, info, warn};

use crate::codec::{HeaderDecoder, ResponseEncoder};
use crate::connection::inbound::{Inbound, SharedInbound};
use crate::handler::Handler;
use crate::protocol::body::Body;
use crate::protocol::{ConnectionError, HttpError, Message, PayloadItem, Request, RequestHeader, Response, ResponseHead};
use crate::protocol::{PayloadSize, SendError};
use crate::stream::{PumpHandle, StreamReader, StreamWriter, spawn_reader};

/// Default size of a single stream read, and initial capacity of the read buffer
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8 * 1024;

/// Where the per-connection control loop currently is.
#[derive(Debug)]
enum State {
    /// Framing the next request header out of the buffer
    AwaitHeader,
    /// A header was framed, the handler has not been called yet
    HaveRequest(RequestHeader),
    /// Writing the handler's response
    Responding { response: Response, keep_alive: bool },
    /// The response was written and the connection stays open
    KeepAlive,
    /// No more requests will be served
    Closing,
}

/// An HTTP connection that frames requests, invokes the handler and streams
/// responses back, one request at a time.
///
/// # Type Parameters
///
/// * `W`: The async writable stream type
pub struct HttpConnection<W> {
    inbound: SharedInbound,
    writer: StreamWriter<W>,
    header_decoder: HeaderDecoder,
    encoder: ResponseEncoder,
    write_buf: BytesMut,
    /// a response head reached the transport and its body is not complete yet
    response_in_flight: bool,
    pump: Option<PumpHandle>,
}

impl<W> fmt::Debug for HttpConnection<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpConnection")
            .field("writable", &self.writer.is_writable())
            .field("pending_write", &self.write_buf.len())
            .field("response_in_flight", &self.response_in_flight)
            .field("pumped", &self.pump.is_some())
            .finish_non_exhaustive()
    }
}

impl<W> HttpConnection<W>
where
    W: AsyncWrite + Unpin,
{
    /// Creates a connection reading from `reader` through a spawned event pump.
    ///
    /// Must be called within a tokio runtime.
    pub fn new<R>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Self::with_capacity(reader, writer, DEFAULT_READ_BUFFER_SIZE)
    }

    pub fn with_capacity<R>(reader: R, writer: W, read_buffer_size: usize) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let (stream_reader, pump) = spawn_reader(reader, read_buffer_size);
        let mut connection = Self::from_parts(stream_reader, writer, read_buffer_size);
        connection.pump = Some(pump);
        connection
    }

    /// Creates a connection over an already built stream adapter.
    pub fn from_parts(reader: StreamReader, writer: W, read_buffer_size: usize) -> Self {
        Self {
            inbound: Inbound::new(reader, read_buffer_size).into_shared(),
            writer: StreamWriter::new(writer),
            header_decoder: HeaderDecoder,
            encoder: ResponseEncoder::new(),
            write_buf: BytesMut::with_capacity(read_buffer_size),
            response_in_flight: false,
            pump: None,
        }
    }

    /// Serves requests until the peer closes, an HTTP/1.0 request is answered, or
    /// an error occurs.
    ///
    /// An [`HttpError`] is answered with a best-effort error response before the
    /// connection closes, unless part of a response was already written; any other
    /// error closes it without a response. The stream is closed on every path.
    pub async fn process<H>(mut self, handler: &H) -> Result<(), ConnectionError>
    where
        H: Handler + ?Sized,
    {
        let result = self.serve(handler).await;

        if let Err(e) = &result {
            match e.as_http_error() {
                Some(http_error) if self.response_in_flight => {
                    warn!(status = %http_error.status(), cause = http_error.message(), "http error while sending response, closing without response");
                }
                Some(http_error) => {
                    warn!(status = %http_error.status(), cause = http_error.message(), "http error, sending error response");
                    if self.writer.is_writable() {
                        self.send_error_response(http_error.clone()).await;
                    }
                }
                None => error!(cause = %e, "connection error, closing without response"),
            }
        }

        self.close().await;
        result
    }

    async fn serve<H>(&mut self, handler: &H) -> Result<(), ConnectionError>
    where
        H: Handler + ?Sized,
    {
        let mut state = State::AwaitHeader;
        loop {
            state = match state {
                State::AwaitHeader => match self.read_header().await? {
                    Some(header) => State::HaveRequest(header),
                    None => State::Closing,
                },

                State::HaveRequest(header) => {
                    let keep_alive = header.keep_alive();
                    let body = Body::from_request(&header, &self.inbound).await?;
                    let response = handler.call(Request::new(header, body)).await?;
                    State::Responding { response, keep_alive }
                }

                State::Responding { response, keep_alive } => {
                    self.send_response(response).await?;
                    if keep_alive { State::KeepAlive } else { State::Closing }
                }

                State::KeepAlive => {
                    // leftover body bytes would corrupt the next header
                    self.inbound.lock().await.skip_body().await?;
                    State::AwaitHeader
                }

                State::Closing => return Ok(()),
            };
        }
    }

    /// Frames the next request header, reading from the stream as needed.
    ///
    /// Returns `None` when the peer closed cleanly between requests.
    async fn read_header(&mut self) -> Result<Option<RequestHeader>, ConnectionError> {
        let mut inbound = self.inbound.lock().await;
        loop {
            if let Some(header) = self.header_decoder.decode(inbound.buffer_mut())? {
                debug!(method = %header.method(), target = header.target(), version = header.version(), "receive request header");
                return Ok(Some(header));
            }

            if inbound.is_eof() {
                if inbound.buffer().is_empty() {
                    info!("peer closed connection, no more requests");
                    return Ok(None);
                }
                return Err(HttpError::bad_request("unexpected EOF").into());
            }

            inbound.fill().await?;
        }
    }

    async fn send_response(&mut self, response: Response) -> Result<(), ConnectionError> {
        let (head, mut body) = response.into_parts();
        let payload_size = body.payload_size();

        self.encode(Message::Header((head, payload_size)))?;
        self.flush().await?;
        self.response_in_flight = true;

        loop {
            let chunk = body.read().await?;
            if chunk.is_empty() {
                self.encode(Message::Payload(PayloadItem::Eof))?;
                break;
            }

            self.encode(Message::Payload(PayloadItem::Chunk(chunk)))?;
            self.flush().await?;
        }

        self.flush().await?;
        self.response_in_flight = false;
        Ok(())
    }

    async fn send_error_response(&mut self, http_error: HttpError) {
        // nothing of the failed response reached the transport
        self.encoder = ResponseEncoder::new();
        self.write_buf.clear();

        if let Err(e) = self.send_response(Response::from(http_error)).await {
            debug!(cause = %e, "failed to send error response");
        }
    }

    fn encode(&mut self, message: Message<(ResponseHead, PayloadSize), Bytes>) -> Result<(), SendError> {
        self.encoder.encode(message, &mut self.write_buf)
    }

    async fn flush(&mut self) -> Result<(), ConnectionError> {
        if self.write_buf.is_empty() {
            return Ok(());
        }

        let bytes = self.write_buf.split().freeze();
        self.writer.write_bytes(bytes).await?;
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.writer.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{EchoHandler, make_handler};
    use crate::stream::recording_adapter;
    use http::StatusCode;
    use indoc::indoc;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream, duplex};

    fn crlf(raw: &str) -> String {
        raw.replace('\n', "\r\n")
    }

    /// Runs `handler` over an in-memory socket fed with `input`, then returns what
    /// the server wrote.
    async fn exchange<H: Handler + 'static>(handler: H, input: &[u8]) -> (Result<(), ConnectionError>, String) {
        exchange_with_capacity(handler, input, DEFAULT_READ_BUFFER_SIZE).await
    }

    async fn exchange_with_capacity<H: Handler + 'static>(
        handler: H,
        input: &[u8],
        read_buffer_size: usize,
    ) -> (Result<(), ConnectionError>, String) {
        let (mut client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);

        let task = tokio::spawn(async move {
            HttpConnection::with_capacity(reader, writer, read_buffer_size).process(&handler).await
        });

        client.write_all(input).await.unwrap();
        client.shutdown().await.unwrap();

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        (task.await.unwrap(), String::from_utf8(output).unwrap())
    }

    async fn read_response(client: &mut DuplexStream, expected: &str) {
        let mut received = vec![0u8; expected.len()];
        client.read_exact(&mut received).await.unwrap();
        assert_eq!(String::from_utf8(received).unwrap(), expected);
    }

    #[tokio::test]
    async fn echo_body_with_computed_length() {
        let input = crlf(indoc! {"
            POST /echo HTTP/1.1
            Host: localhost
            Content-Length: 3

            abc"});

        let (result, output) = exchange(EchoHandler, input.as_bytes()).await;

        assert!(result.is_ok());
        assert_eq!(output, "HTTP/1.1 200 OK\r\nServer: pull-http\r\nContent-Length: 3\r\n\r\nabc");
    }

    #[tokio::test]
    async fn default_path_gets_fixed_body() {
        let input = crlf(indoc! {"
            GET /index.html HTTP/1.1
            Host: localhost

        "});

        let (result, output) = exchange(EchoHandler, input.as_bytes()).await;

        assert!(result.is_ok());
        assert_eq!(output, "HTTP/1.1 200 OK\r\nServer: pull-http\r\nContent-Length: 14\r\n\r\nHello World!\r\n");
    }

    #[tokio::test]
    async fn http10_closes_after_one_response() {
        let (mut client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);
        let task = tokio::spawn(async move { HttpConnection::new(reader, writer).process(&EchoHandler).await });

        // the client keeps its side open and even sends a second request
        client.write_all(b"GET / HTTP/1.0\r\n\r\nGET / HTTP/1.0\r\n\r\n").await.unwrap();

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();

        assert!(task.await.unwrap().is_ok());
        let output = String::from_utf8(output).unwrap();
        assert_eq!(output.matches("HTTP/1.1 200 OK").count(), 1);
    }

    #[tokio::test]
    async fn keep_alive_drains_unread_body() {
        let (mut client, server) = duplex(64 * 1024);
        let (reader, writer) = tokio::io::split(server);

        // never reads the body
        let handler = make_handler(|_req: Request| async { Ok::<_, ConnectionError>(Response::new(StatusCode::OK, "ok")) });
        let task = tokio::spawn(async move { HttpConnection::new(reader, writer).process(&handler).await });

        client.write_all(b"POST /upload HTTP/1.1\r\nContent-Length: 5\r\n\r\nhel").await.unwrap();
        let expected = "HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
        read_response(&mut client, expected).await;

        // the rest of the first body arrives after the response
        client.write_all(b"lo").await.unwrap();
        client.write_all(b"GET / HTTP/1.1\r\n\r\n").await.unwrap();
        read_response(&mut client, expected).await;

        client.shutdown().await.unwrap();
        let mut rest = Vec::new();
        client.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn pipelined_requests_in_one_read() {
        let input = b"POST /echo HTTP/1.1\r\nContent-Length: 2\r\n\r\nhiPOST /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\nyou";
        let (result, output) = exchange(EchoHandler, input).await;

        assert!(result.is_ok());
        assert_eq!(
            output,
            "HTTP/1.1 200 OK\r\nServer: pull-http\r\nContent-Length: 2\r\n\r\nhi\
             HTTP/1.1 200 OK\r\nServer: pull-http\r\nContent-Length: 3\r\n\r\nyou"
        );
    }

    #[tokio::test]
    async fn bad_request_line_is_answered_then_closed() {
        let (result, output) = exchange(EchoHandler, b"GET /\r\n\r\nGET / HTTP/1.1\r\n\r\n").await;

        let status = result.unwrap_err().as_http_error().map(HttpError::status);
        assert_eq!(status, Some(StatusCode::BAD_REQUEST));
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.ends_with("malformed request line: GET /"));
        assert_eq!(output.matches("HTTP/1.1").count(), 1);
    }

    #[tokio::test]
    async fn get_with_body_is_rejected() {
        let (result, output) = exchange(EchoHandler, b"GET / HTTP/1.1\r\nContent-Length: 10\r\n\r\n").await;

        assert!(result.is_err());
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn body_without_length_is_not_implemented() {
        let (_result, output) = exchange(EchoHandler, b"POST /echo HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n").await;
        assert!(output.starts_with("HTTP/1.1 501 Not Implemented\r\n"));
    }

    #[tokio::test]
    async fn oversized_header_is_413() {
        let mut input = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
        input.extend(std::iter::repeat_n(b'a', 9000));

        let (result, output) = exchange(EchoHandler, &input).await;

        assert_eq!(result.unwrap_err().as_http_error().map(HttpError::status), Some(StatusCode::PAYLOAD_TOO_LARGE));
        assert!(output.starts_with("HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[tokio::test]
    async fn clean_close_between_requests() {
        let (result, output) = exchange(EchoHandler, b"").await;
        assert!(result.is_ok());
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn eof_mid_header_is_bad_request() {
        let (result, output) = exchange(EchoHandler, b"GET / HTTP/1.1\r\nHost").await;

        assert!(result.is_err());
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
        assert!(output.ends_with("unexpected EOF"));
    }

    #[tokio::test]
    async fn eof_mid_body_is_bad_request() {
        let (result, output) = exchange(EchoHandler, b"POST /echo HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await;

        assert!(result.is_err());
        assert!(output.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }

    #[tokio::test]
    async fn handler_http_error_becomes_response() {
        let handler = make_handler(|_req: Request| async {
            Err::<Response, ConnectionError>(HttpError::new(StatusCode::FORBIDDEN, "go away").into())
        });
        let (result, output) = exchange(handler, b"GET /secret HTTP/1.1\r\n\r\n").await;

        assert!(result.is_err());
        assert!(output.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(output.ends_with("\r\n\r\ngo away"));
    }

    #[tokio::test]
    async fn one_byte_reads_frame_the_same_requests() {
        let input = b"POST /echo HTTP/1.1\r\nHost: localhost\r\nContent-Length: 3\r\n\r\nabcGET /x HTTP/1.1\r\n\r\n";
        let (result, output) = exchange_with_capacity(EchoHandler, input, 1).await;

        assert!(result.is_ok());
        assert_eq!(
            output,
            "HTTP/1.1 200 OK\r\nServer: pull-http\r\nContent-Length: 3\r\n\r\nabc\
             HTTP/1.1 200 OK\r\nServer: pull-http\r\nContent-Length: 14\r\n\r\nHello World!\r\n"
        );
    }

    #[tokio::test]
    async fn error_mid_response_body_closes_without_second_response() {
        // streams the request body straight back as the response body
        let handler = make_handler(|req: Request| async move {
            let (_header, body) = req.into_parts();
            Ok::<_, ConnectionError>(Response::new(StatusCode::OK, body))
        });

        let (result, output) = exchange(handler, b"POST /echo HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await;

        assert_eq!(result.unwrap_err().as_http_error().map(HttpError::status), Some(StatusCode::BAD_REQUEST));
        assert_eq!(output, "HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc");
    }

    #[tokio::test]
    async fn unknown_length_response_is_not_sent() {
        let handler = make_handler(|_req: Request| async {
            Ok::<_, ConnectionError>(Response::new(StatusCode::OK, Body::with_unknown_length("streamed")))
        });

        let (result, output) = exchange(handler, b"GET / HTTP/1.1\r\n\r\n").await;

        assert!(matches!(result, Err(ConnectionError::Send { source: SendError::Unsupported { .. } })));
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn debug_reports_connection_state() {
        let (reader, _events, _flow) = recording_adapter();
        let connection = HttpConnection::from_parts(reader, Vec::<u8>::new(), 1024);

        let debug = format!("{connection:?}");
        assert!(debug.starts_with("HttpConnection"));
        assert!(debug.contains("writable: true"));
        assert!(debug.contains("response_in_flight: false"));
    }

    #[tokio::test]
    async fn transport_error_closes_without_response() {
        let (reader, events, _flow) = recording_adapter();
        let (mut client, server) = duplex(1024);

        let task = tokio::spawn(async move { HttpConnection::from_parts(reader, server, 1024).process(&EchoHandler).await });

        events.on_data(bytes::Bytes::from_static(b"GET / HT"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        events.on_error(crate::protocol::StreamError::io(std::io::Error::from(std::io::ErrorKind::ConnectionReset)));

        let result = task.await.unwrap();
        assert!(matches!(result, Err(ConnectionError::Stream { .. })));

        let mut output = Vec::new();
        client.read_to_end(&mut output).await.unwrap();
        assert!(output.is_empty());
    }
}
