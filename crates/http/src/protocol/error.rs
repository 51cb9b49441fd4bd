use std::borrow::Cow;
use std::io;
use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

/// Top level error of a connection.
///
/// Only [`ConnectionError::Http`] is answered with a response, every other variant
/// tears the connection down silently.
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("http error: {source}")]
    Http {
        #[from]
        source: HttpError,
    },

    #[error("stream error: {source}")]
    Stream {
        #[from]
        source: StreamError,
    },

    #[error("send error: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

impl ConnectionError {
    pub fn as_http_error(&self) -> Option<&HttpError> {
        match self {
            ConnectionError::Http { source } => Some(source),
            _ => None,
        }
    }
}

/// An HTTP level failure: a status code plus a human readable message.
///
/// It carries everything needed to be turned into a response, see
/// [`Response::from`](crate::protocol::Response).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status}: {message}")]
pub struct HttpError {
    status: StatusCode,
    message: Cow<'static, str>,
}

impl HttpError {
    pub fn new<M: Into<Cow<'static, str>>>(status: StatusCode, message: M) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request<M: Into<Cow<'static, str>>>(message: M) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn header_too_large(current_size: usize, max_size: usize) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, format!("header too large, current: {current_size} exceed the limit {max_size}"))
    }

    pub fn not_implemented<M: Into<Cow<'static, str>>>(message: M) -> Self {
        Self::new(StatusCode::NOT_IMPLEMENTED, message)
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors reported by the byte stream adapter.
///
/// Cloneable so a transport failure can be stored once and replayed to every
/// later read.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    #[error("io error: {source}")]
    Io { source: Arc<io::Error> },

    #[error("a read is already pending on this stream")]
    ReadPending,

    #[error("stream already reached end of stream")]
    Closed,
}

impl StreamError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: Arc::new(e.into()) }
    }
}

impl From<io::Error> for StreamError {
    fn from(e: io::Error) -> Self {
        Self::io(e)
    }
}

#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("unsupported response: {reason}")]
    Unsupported { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn unsupported<S: ToString>(str: S) -> Self {
        Self::Unsupported { reason: str.to_string() }
    }
}
