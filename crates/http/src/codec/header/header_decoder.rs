//! HTTP header decoder implementation for framing and parsing HTTP request headers
//!
//! This module scans the connection buffer for a complete request header block and
//! parses it into a [`RequestHeader`].
//!
//! # Limits
//!
//! - Maximum header size: 8KB, including the terminating blank line
//! - Methods: GET, POST, PUT, DELETE, HEAD, OPTIONS, PATCH, CONNECT, TRACE
//!
//! # Implementation Details
//!
//! The decoder works in multiple stages:
//!
//! 1. Search the valid region of the buffer for `CRLF CRLF`
//! 2. Cut the header block off the front of the buffer
//! 3. Parse the request line into method, target and version
//! 4. Validate each header line and keep it verbatim

use std::str;

use http::{HeaderName, Method};
use tracing::trace;

use crate::buffer::GrowableBuffer;
use crate::ensure;
use crate::protocol::{HeaderLines, HttpError, RequestHeader};

/// Maximum size in bytes allowed for the entire header section
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

const HEADER_END: &[u8] = b"\r\n\r\n";

/// Frames and parses request headers out of a [`GrowableBuffer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderDecoder;

impl HeaderDecoder {
    /// Attempts to cut a complete request header off the front of `src`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(header))` if a complete header was parsed; the header bytes are
    ///   consumed from `src`, anything after them stays buffered
    /// - `Ok(None)` if more data is needed
    ///
    /// # Errors
    ///
    /// - 413 if the header block reaches [`MAX_HEADER_BYTES`]
    /// - 400 if the request line, the method or a header line is malformed
    pub fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<RequestHeader>, HttpError> {
        let Some(position) = find_header_end(src.as_slice()) else {
            ensure!(src.len() < MAX_HEADER_BYTES, HttpError::header_too_large(src.len(), MAX_HEADER_BYTES));
            return Ok(None);
        };

        let header_size = position + HEADER_END.len();
        trace!(header_size = header_size, "found header end");
        ensure!(header_size <= MAX_HEADER_BYTES, HttpError::header_too_large(header_size, MAX_HEADER_BYTES));

        let parsed = parse_header(&src.as_slice()[..position]);
        src.consume_front(header_size);
        parsed.map(Some)
    }
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(HEADER_END.len()).position(|window| window == HEADER_END)
}

/// Parses a header block without its terminating blank line.
fn parse_header(block: &[u8]) -> Result<RequestHeader, HttpError> {
    let text = str::from_utf8(block).map_err(|e| HttpError::bad_request(format!("bad field: header is not valid utf-8, {e}")))?;

    let mut lines = text.split("\r\n");
    let request_line = lines.next().unwrap_or_default();

    let tokens: Vec<&str> = request_line.split(' ').collect();
    let [method, target, version] = tokens[..] else {
        return Err(HttpError::bad_request(format!("malformed request line: {request_line}")));
    };
    ensure!(
        !target.is_empty() && !version.is_empty(),
        HttpError::bad_request(format!("malformed request line: {request_line}"))
    );

    let method = parse_method(method)?;

    let mut headers = HeaderLines::new();
    for line in lines {
        check_field(line)?;
        headers.push_line(line.to_string());
    }

    Ok(RequestHeader::new(method, target.to_string(), version.to_string(), headers))
}

fn parse_method(token: &str) -> Result<Method, HttpError> {
    let method = match token {
        "GET" => Method::GET,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "HEAD" => Method::HEAD,
        "OPTIONS" => Method::OPTIONS,
        "PATCH" => Method::PATCH,
        "CONNECT" => Method::CONNECT,
        "TRACE" => Method::TRACE,
        _ => return Err(HttpError::bad_request(format!("invalid method: {token}"))),
    };
    Ok(method)
}

fn check_field(line: &str) -> Result<(), HttpError> {
    let bad_field = || HttpError::bad_request(format!("bad field: {line}"));

    let (name, value) = line.split_once(':').ok_or_else(bad_field)?;
    let name = name.trim();

    ensure!(!name.is_empty() && !value.trim().is_empty(), bad_field());
    // names must be RFC 7230 tokens
    ensure!(HeaderName::from_bytes(name.as_bytes()).is_ok(), bad_field());
    Ok(())
}
