//! HTTP header encoder implementation for serializing HTTP response headers
//!
//! Renders the status line with a fixed reason phrase table, the caller's header
//! lines, and a `Content-Length` line computed from the body's declared length.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::StatusCode;
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{PayloadSize, ResponseHead, SendError};

/// Initial buffer size reserved for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Reason phrase for codes missing from [`reason_phrase`]'s table
pub const UNKNOWN_REASON: &str = "Unknown";

/// Encoder for HTTP response headers implementing the [`Encoder`] trait.
///
/// The response must not carry a `Content-Length` line of its own; the encoder
/// appends one from the [`PayloadSize`]. Unknown lengths would need chunked
/// encoding, which is not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, payload_size) = item;

        let Some(length) = payload_size.length() else {
            error!(status = %head.status(), "response body without declared length");
            return Err(SendError::unsupported("chunked response encoding is not supported"));
        };

        debug_assert!(!head.headers().contains("Content-Length"), "content-length must be computed by the encoder");

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "HTTP/1.1 {} {}\r\n", head.status().as_str(), reason_phrase(head.status()))?;

        for line in head.headers().lines() {
            dst.put_slice(line.as_bytes());
            dst.put_slice(b"\r\n");
        }
        write!(FastWrite(dst), "Content-Length: {length}\r\n")?;
        dst.put_slice(b"\r\n");
        Ok(())
    }
}

/// The fixed code to reason phrase table.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    match status.as_u16() {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => UNKNOWN_REASON,
    }
}

/// Writer appending to a `BytesMut`, used with `write!`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
