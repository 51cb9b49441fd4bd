//! HTTP response types.

use http::StatusCode;

use crate::protocol::body::Body;
use crate::protocol::{HeaderLines, HttpError};

/// The header portion of a response: status code plus header lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    status: StatusCode,
    headers: HeaderLines,
}

impl ResponseHead {
    pub fn new(status: StatusCode, headers: HeaderLines) -> Self {
        Self { status, headers }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderLines {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderLines {
        &mut self.headers
    }
}

/// A response produced by a handler.
///
/// Callers never set `Content-Length`: the encoder derives it from the body's
/// declared length.
#[derive(Debug)]
pub struct Response {
    head: ResponseHead,
    body: Body,
}

impl Response {
    pub fn new<B: Into<Body>>(status: StatusCode, body: B) -> Self {
        Self { head: ResponseHead::new(status, HeaderLines::new()), body: body.into() }
    }

    /// Appends a header line, builder style.
    pub fn header(mut self, name: &str, value: impl std::fmt::Display) -> Self {
        self.head.headers_mut().append(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.head.status()
    }

    pub fn headers(&self) -> &HeaderLines {
        self.head.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderLines {
        self.head.headers_mut()
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    pub fn into_parts(self) -> (ResponseHead, Body) {
        (self.head, self.body)
    }
}

/// The error's status code, with its message as a plain text body.
impl From<HttpError> for Response {
    fn from(e: HttpError) -> Self {
        Response::new(e.status(), e.message().to_string()).header("Content-Type", "text/plain; charset=utf-8")
    }
}
