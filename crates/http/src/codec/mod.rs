//! HTTP codec module for framing requests and encoding responses
//!
//! - Request side:
//!   - [`HeaderDecoder`]: frames and parses request headers from the connection buffer
//!
//! - Response side:
//!   - [`ResponseEncoder`]: encodes a response head followed by its body chunks
//!   - Header rendering via [`HeaderEncoder`], with the fixed [`reason_phrase`] table
//!
//! Request bodies are not decoded here: they are read lazily through
//! [`Body`](crate::protocol::body::Body).

mod body;
mod header;
mod response_encoder;

pub use header::HeaderDecoder;
pub use header::HeaderEncoder;
pub use header::MAX_HEADER_BYTES;
pub use header::reason_phrase;
pub use response_encoder::ResponseEncoder;
