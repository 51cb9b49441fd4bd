//! HTTP header processing module for framing requests and encoding responses
//!
//! - [`HeaderDecoder`]: cuts request headers out of the connection buffer
//!   - Enforces the header size limit
//!   - Validates the request line, method whitelist and header fields
//!
//! - [`HeaderEncoder`]: renders response headers
//!   - Fixed reason phrase table
//!   - Computes the `Content-Length` line

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub use header_decoder::MAX_HEADER_BYTES;
pub use header_encoder::HeaderEncoder;
pub use header_encoder::reason_phrase;
