use std::fmt;

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::connection::inbound::SharedInbound;
use crate::ensure;
use crate::protocol::{ConnectionError, HttpError, PayloadSize, RequestHeader};

/// A lazy, pull-based body reader.
///
/// [`read`](Body::read) yields the body in bounded chunks and signals completion with
/// an empty chunk. Two variants exist:
///
/// - stream-backed: the body of a request, read from the connection's buffer and
///   stream until its declared length is exhausted
/// - memory-backed: a payload held in memory, yielded whole on the first read
///
/// A memory-backed body may also hide its length, see
/// [`with_unknown_length`](Body::with_unknown_length).
pub struct Body {
    kind: Kind,
}

enum Kind {
    Stream { inbound: SharedInbound, seq: u64, length: u64 },
    Memory { payload: Option<Bytes>, size: PayloadSize },
}

impl Body {
    /// An empty memory-backed body.
    pub fn empty() -> Self {
        Self::memory(Bytes::new())
    }

    /// A memory-backed body yielding `payload` once.
    pub fn memory<B: Into<Bytes>>(payload: B) -> Self {
        let payload = payload.into();
        let size = PayloadSize::Length(payload.len() as u64);
        Self { kind: Kind::Memory { payload: Some(payload), size } }
    }

    /// A memory-backed body that declares [`PayloadSize::Unknown`].
    ///
    /// Such a body could only be framed with chunked or close-delimited encoding,
    /// so sending it as a response fails with
    /// [`SendError::Unsupported`](crate::protocol::SendError::Unsupported).
    pub fn with_unknown_length<B: Into<Bytes>>(payload: B) -> Self {
        Self { kind: Kind::Memory { payload: Some(payload.into()), size: PayloadSize::Unknown } }
    }

    /// Builds the body reader for a freshly framed request.
    ///
    /// # Errors
    ///
    /// - 400 if the content-length is not a base-10 integer
    /// - 400 if a body-disallowed method carries a body
    /// - 501 for chunked transfer encoding or a body without any length information
    pub(crate) async fn from_request(header: &RequestHeader, inbound: &SharedInbound) -> Result<Self, HttpError> {
        let length = parse_payload(header)?;

        let seq = inbound.lock().await.begin_body(length);
        if length == 0 {
            return Ok(Self::empty());
        }

        trace!(length = length, "stream-backed request body");
        Ok(Self { kind: Kind::Stream { inbound: SharedInbound::clone(inbound), seq, length } })
    }

    /// The declared length of this body.
    pub fn payload_size(&self) -> PayloadSize {
        match &self.kind {
            Kind::Stream { length, .. } => PayloadSize::Length(*length),
            Kind::Memory { size, .. } => *size,
        }
    }

    /// Returns the next chunk, or an empty chunk once the body is complete.
    pub async fn read(&mut self) -> Result<Bytes, ConnectionError> {
        match &mut self.kind {
            Kind::Stream { inbound, seq, .. } => inbound.lock().await.read_body(*seq).await,
            Kind::Memory { payload, .. } => Ok(payload.take().unwrap_or_default()),
        }
    }

    /// Reads the body to completion.
    pub async fn collect(&mut self) -> Result<Bytes, ConnectionError> {
        let first = self.read().await?;
        if first.is_empty() {
            return Ok(first);
        }

        let mut second = self.read().await?;
        if second.is_empty() {
            return Ok(first);
        }

        let mut collected = BytesMut::with_capacity(first.len() + second.len());
        collected.extend_from_slice(&first);
        while !second.is_empty() {
            collected.extend_from_slice(&second);
            second = self.read().await?;
        }
        Ok(collected.freeze())
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<&'static str> for Body {
    fn from(value: &'static str) -> Self {
        Self::memory(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::memory(value)
    }
}

impl From<Bytes> for Body {
    fn from(value: Bytes) -> Self {
        Self::memory(value)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            Kind::Stream { .. } => "stream",
            Kind::Memory { .. } => "memory",
        };
        f.debug_struct("Body").field("kind", &kind).field("payload_size", &self.payload_size()).finish()
    }
}

/// Determines the declared body length of a request.
///
/// Refer: <https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length>, restricted
/// to content-length framing.
fn parse_payload(header: &RequestHeader) -> Result<u64, HttpError> {
    let chunked = is_chunked(header.headers().get("Transfer-Encoding"));
    let content_length = header.headers().get("Content-Length").map(parse_content_length).transpose()?;

    if !header.need_body() {
        ensure!(
            !chunked && content_length.unwrap_or(0) == 0,
            HttpError::bad_request(format!("{} request must not carry a body", header.method()))
        );
        return Ok(0);
    }

    ensure!(!chunked, HttpError::not_implemented("chunked transfer encoding is not implemented"));

    content_length.ok_or_else(|| HttpError::not_implemented("request body without content-length is not implemented"))
}

fn parse_content_length(value: &str) -> Result<u64, HttpError> {
    value.parse::<u64>().map_err(|e| HttpError::bad_request(format!("invalid content-length: {value}, {e}")))
}

/// Checks if the Transfer-Encoding header indicates chunked encoding.
///
/// According to RFC 7230, chunked must be the last encoding if present.
fn is_chunked(header_value: Option<&str>) -> bool {
    match header_value.and_then(|value| value.rsplit(',').next()) {
        Some(last) => last.trim().eq_ignore_ascii_case("chunked"),
        None => false,
    }
}
