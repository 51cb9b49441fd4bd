//! HTTP connection handling.
//!
//! [`HttpConnection`] drives one client connection through a sequential control
//! loop: frame a request header, build its body reader, call the handler, stream
//! the response back, drain whatever body the handler left unread, and repeat
//! while the connection is kept alive.
//!
//! Everything on a connection happens one step at a time. A read is never issued
//! while another is outstanding, and the buffer is only touched by the step that
//! currently owns it. The stream is closed on every exit path.

pub(crate) mod inbound;
mod http_connection;

pub use http_connection::DEFAULT_READ_BUFFER_SIZE;
pub use http_connection::HttpConnection;
