//! A pull-based HTTP/1.1 server pipeline
//!
//! Each connection is served by one sequential task. The socket's push style events
//! are turned into a demand driven read interface with backpressure, requests are
//! framed incrementally out of a growable buffer, the handler pulls the body when it
//! wants it, and the response is streamed back with a computed `Content-Length`.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use pull_http::connection::HttpConnection;
//! use pull_http::handler::make_handler;
//! use pull_http::protocol::{ConnectionError, Request, Response};
//!
//! #[tokio::main]
//! async fn main() {
//!     let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
//!     tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(handler.as_ref()).await {
//!                 Ok(()) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: Request) -> Result<Response, ConnectionError> {
//!     let (header, mut body) = request.into_parts();
//!     info!(path = header.path(), "receive request");
//!
//!     let body_bytes = body.collect().await?;
//!     info!(size = body_bytes.len(), "receiving request body");
//!
//!     Ok(Response::new(StatusCode::OK, "Hello World!\r\n"))
//! }
//! ```
//!
//! # Architecture
//!
//! - [`stream`]: the byte stream adapter, turning `data`/`end`/`error` events into
//!   single outstanding reads, plus the writer
//! - [`buffer`]: the growable byte buffer holding unparsed input
//! - [`codec`]: the request header framer and the response encoder
//! - [`protocol`]: request, response, body reader and error types
//! - [`connection`]: the per-connection control loop
//! - [`handler`]: the handler contract and a sample echo handler
//! - [`server`]: the listening socket bootstrap
//!
//! # Error Handling
//!
//! - [`protocol::HttpError`]: answered with its status and message, then the connection closes
//! - [`protocol::StreamError`]: transport failures, the connection closes without a response
//! - [`protocol::SendError`]: response encoding failures, handled like transport failures
//! - [`protocol::ConnectionError`]: wraps all of the above
//!
//! # Limitations
//!
//! - HTTP/1.1 only, no TLS
//! - request and response bodies need a `Content-Length`; chunked framing is rejected
//! - maximum header size: 8KB
//! - no timeouts: an idle peer keeps its task suspended until the transport fails

pub mod buffer;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod server;
pub mod stream;

mod utils;
pub(crate) use utils::ensure;
