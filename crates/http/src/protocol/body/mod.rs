//! HTTP body reader.
//!
//! Request and response bodies share one pull-based abstraction, [`Body`]. A body
//! declares its length up front through [`PayloadSize`](crate::protocol::PayloadSize)
//! and is read chunk by chunk until an empty chunk signals completion.
//!
//! Request bodies are stream-backed: they read from the connection's buffer and only
//! pull from the stream when the buffer is empty, never past the declared length.
//! Whatever the handler leaves unread is drained by the connection before the next
//! request is framed.

mod req_body;

pub use req_body::Body;
