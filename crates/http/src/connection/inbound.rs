//! The read side of a connection: the stream plus the buffer assembling its bytes.
//!
//! Shared between the connection driver (framing headers, draining bodies) and the
//! stream-backed [`Body`](crate::protocol::body::Body) of the current request.
//! Operations are strictly sequential; the mutex only makes the sharing explicit.

use std::cmp;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{info, trace};

use crate::buffer::GrowableBuffer;
use crate::protocol::{ConnectionError, HttpError};
use crate::stream::StreamReader;

pub(crate) type SharedInbound = Arc<Mutex<Inbound>>;

#[derive(Debug)]
pub(crate) struct Inbound {
    reader: StreamReader,
    buffer: GrowableBuffer,
    eof: bool,
    /// identifies the request whose body may currently be read
    request_seq: u64,
    body_remaining: u64,
}

impl Inbound {
    pub(crate) fn new(reader: StreamReader, buffer_capacity: usize) -> Self {
        Self { reader, buffer: GrowableBuffer::with_capacity(buffer_capacity), eof: false, request_seq: 0, body_remaining: 0 }
    }

    pub(crate) fn into_shared(self) -> SharedInbound {
        Arc::new(Mutex::new(self))
    }

    #[inline]
    pub(crate) fn buffer_mut(&mut self) -> &mut GrowableBuffer {
        &mut self.buffer
    }

    #[inline]
    pub(crate) fn buffer(&self) -> &GrowableBuffer {
        &self.buffer
    }

    /// True once the stream delivered its end-of-stream chunk.
    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.eof
    }

    /// Performs exactly one stream read and appends the result to the buffer.
    ///
    /// Returns false if the stream reached end-of-stream instead.
    pub(crate) async fn fill(&mut self) -> Result<bool, ConnectionError> {
        let bytes = self.reader.read().await?;
        if bytes.is_empty() {
            trace!("stream reached end of stream");
            self.eof = true;
            return Ok(false);
        }

        self.buffer.append(&bytes);
        Ok(true)
    }

    /// Starts the body of a new request and returns the sequence number tying a
    /// body reader to it.
    pub(crate) fn begin_body(&mut self, length: u64) -> u64 {
        self.request_seq += 1;
        self.body_remaining = length;
        self.request_seq
    }

    /// Reads the next chunk of the body started with `seq`.
    ///
    /// Empty means the body is complete, or `seq` belongs to an earlier request.
    pub(crate) async fn read_body(&mut self, seq: u64) -> Result<Bytes, ConnectionError> {
        if seq != self.request_seq || self.body_remaining == 0 {
            return Ok(Bytes::new());
        }

        if self.buffer.is_empty() && (self.eof || !self.fill().await?) {
            return Err(HttpError::bad_request("unexpected end of stream while reading body").into());
        }

        let size = cmp::min(self.buffer.len() as u64, self.body_remaining) as usize;
        let chunk = Bytes::copy_from_slice(&self.buffer.as_slice()[..size]);
        self.buffer.consume_front(size);
        self.body_remaining -= size as u64;

        Ok(chunk)
    }

    /// Reads and discards whatever is left of the current request body.
    pub(crate) async fn skip_body(&mut self) -> Result<(), ConnectionError> {
        let seq = self.request_seq;
        let mut size: usize = 0;
        loop {
            let chunk = self.read_body(seq).await?;
            if chunk.is_empty() {
                break;
            }
            size += chunk.len();
        }

        if size > 0 {
            info!(size = size, "skip request body");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::recording_adapter;

    #[tokio::test]
    async fn body_reads_stop_at_length() {
        let (reader, events, _flow) = recording_adapter();
        let mut inbound = Inbound::new(reader, 0);

        events.on_data(Bytes::from_static(b"hello"));
        events.on_data(Bytes::from_static(b"GET / HTTP/1.1\r\n\r\n"));

        let seq = inbound.begin_body(5);
        assert_eq!(inbound.read_body(seq).await.unwrap(), Bytes::from_static(b"hello"));
        assert!(inbound.read_body(seq).await.unwrap().is_empty());

        // the bytes after the body stay buffered for the next request
        assert_eq!(inbound.buffer().as_slice(), b"GET / HTTP/1.1\r\n\r\n");
    }

    #[tokio::test]
    async fn premature_end_fails_body() {
        let (reader, events, _flow) = recording_adapter();
        let mut inbound = Inbound::new(reader, 0);

        events.on_data(Bytes::from_static(b"he"));
        events.on_end();

        let seq = inbound.begin_body(5);
        assert_eq!(inbound.read_body(seq).await.unwrap(), Bytes::from_static(b"he"));

        let e = inbound.read_body(seq).await.unwrap_err();
        assert_eq!(e.as_http_error().map(HttpError::status), Some(http::StatusCode::BAD_REQUEST));
    }

    #[tokio::test]
    async fn stale_body_reads_nothing() {
        let (reader, events, _flow) = recording_adapter();
        let mut inbound = Inbound::new(reader, 0);
        events.on_data(Bytes::from_static(b"abcdef"));

        let old = inbound.begin_body(3);
        let _new = inbound.begin_body(3);

        assert!(inbound.read_body(old).await.unwrap().is_empty());
        assert_eq!(inbound.buffer().len(), 0);
    }

    #[tokio::test]
    async fn skip_body_drains_remaining() {
        let (reader, events, _flow) = recording_adapter();
        let mut inbound = Inbound::new(reader, 0);
        events.on_data(Bytes::from_static(b"0123456789rest"));

        let seq = inbound.begin_body(10);
        assert_eq!(inbound.read_body(seq).await.unwrap().len(), 10);

        let seq = inbound.begin_body(4);
        inbound.skip_body().await.unwrap();
        assert!(inbound.read_body(seq).await.unwrap().is_empty());
        assert!(inbound.buffer().is_empty());
    }
}
