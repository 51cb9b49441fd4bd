//! HTTP request header handling implementation.
//!
//! This module provides the parsed request header produced by the framer and the
//! [`Request`] handed to handlers, which pairs the header with its body reader.

use http::Method;

use crate::protocol::HeaderLines;
use crate::protocol::body::Body;

/// Represents a parsed HTTP request header.
///
/// Produced by [`HeaderDecoder`](crate::codec::HeaderDecoder) and immutable afterwards:
/// - the method, one of the whitelisted standard methods
/// - the request target, as sent
/// - the version token, as sent (for example `HTTP/1.1`)
/// - the header lines, verbatim and in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    method: Method,
    target: String,
    version: String,
    headers: HeaderLines,
}

impl RequestHeader {
    pub(crate) fn new(method: Method, target: String, version: String, headers: HeaderLines) -> Self {
        Self { method, target, version, headers }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request target exactly as received.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the request target without its query string.
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _query)) => path,
            None => &self.target,
        }
    }

    /// Returns the version token, for example `HTTP/1.1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns a reference to the request's header lines.
    pub fn headers(&self) -> &HeaderLines {
        &self.headers
    }

    /// Returns false when the connection must be closed after the response.
    ///
    /// Only `HTTP/1.0` requests close the connection, every other version keeps it.
    pub fn keep_alive(&self) -> bool {
        self.version != "HTTP/1.0"
    }

    /// Determines if this request may carry a body based on its HTTP method.
    ///
    /// Returns false for methods that don't have bodies:
    /// - GET
    /// - HEAD
    /// - DELETE
    /// - OPTIONS
    /// - CONNECT
    /// - TRACE
    pub fn need_body(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD | Method::DELETE | Method::OPTIONS | Method::CONNECT | Method::TRACE)
    }
}

/// A request handed to a [`Handler`](crate::handler::Handler): the parsed header
/// plus the reader for its body.
#[derive(Debug)]
pub struct Request {
    header: RequestHeader,
    body: Body,
}

impl Request {
    pub fn new(header: RequestHeader, body: Body) -> Self {
        Self { header, body }
    }

    pub fn header(&self) -> &RequestHeader {
        &self.header
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn into_parts(self) -> (RequestHeader, Body) {
        (self.header, self.body)
    }
}
