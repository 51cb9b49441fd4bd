//! Listening socket bootstrap.
//!
//! A [`Server`] accepts TCP connections and runs each one as an independent
//! [`HttpConnection`] task sharing nothing but the handler.
//!
//! ```no_run
//! use pull_http::handler::EchoHandler;
//! use pull_http::server::Server;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let server = Server::builder().address("127.0.0.1:8080").handler(EchoHandler).build()?;
//! server.start().await?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::connection::{DEFAULT_READ_BUFFER_SIZE, HttpConnection};
use crate::handler::Handler;

pub struct ServerBuilder {
    address: Option<io::Result<Vec<SocketAddr>>>,
    read_buffer_size: usize,
    handler: Option<Arc<dyn Handler>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { address: None, read_buffer_size: DEFAULT_READ_BUFFER_SIZE, handler: None }
    }

    /// The address to listen on; resolution failures are reported by [`build`](Self::build).
    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Self {
        self.address = Some(address.to_socket_addrs().map(|addrs| addrs.collect()));
        self
    }

    /// Size of a single socket read and initial capacity of each connection's buffer.
    pub fn read_buffer_size(mut self, read_buffer_size: usize) -> Self {
        self.read_buffer_size = read_buffer_size;
        self
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let handler = self.handler.ok_or(ServerBuildError::MissingHandler)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?.map_err(|source| ServerBuildError::InvalidAddress { source })?;
        if address.is_empty() {
            return Err(ServerBuildError::MissingAddress);
        }
        if self.read_buffer_size == 0 {
            return Err(ServerBuildError::InvalidReadBufferSize);
        }

        Ok(Server { handler, address, read_buffer_size: self.read_buffer_size })
    }
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("address", &self.address)
            .field("read_buffer_size", &self.read_buffer_size)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}

pub struct Server {
    handler: Arc<dyn Handler>,
    address: Vec<SocketAddr>,
    read_buffer_size: usize,
}

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("handler must be set")]
    MissingHandler,
    #[error("address must be set")]
    MissingAddress,
    #[error("address can't be resolved: {source}")]
    InvalidAddress { source: io::Error },
    #[error("read buffer size must be positive")]
    InvalidReadBufferSize,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn address(&self) -> &[SocketAddr] {
        &self.address
    }

    /// Binds the listening socket and serves connections until the process ends.
    ///
    /// # Errors
    ///
    /// Only failing to bind is returned; accept failures are logged and skipped.
    pub async fn start(self) -> io::Result<()> {
        info!("start listening at {:?}", self.address);
        let tcp_listener = match TcpListener::bind(self.address.as_slice()).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(cause = %e, "bind server error");
                return Err(e);
            }
        };

        loop {
            let (tcp_stream, remote_addr) = match tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };
            debug!(%remote_addr, "accept connection");

            let handler = Arc::clone(&self.handler);
            let read_buffer_size = self.read_buffer_size;

            tokio::spawn(async move {
                let (reader, writer) = tcp_stream.into_split();
                let connection = HttpConnection::with_capacity(reader, writer, read_buffer_size);
                match connection.process(handler.as_ref()).await {
                    Ok(()) => info!(%remote_addr, "finished process, connection shutdown"),
                    Err(e) => error!(%remote_addr, cause = %e, "service has error, connection shutdown"),
                }
            });
        }
    }
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("address", &self.address).field("read_buffer_size", &self.read_buffer_size).finish_non_exhaustive()
    }
}
