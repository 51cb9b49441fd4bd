use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

use crate::protocol::StreamError;

/// Write side of a byte stream.
///
/// A write completes once the bytes are fully handed to the transport. After the
/// first failure the writer is marked unusable and every later write fails fast.
#[derive(Debug)]
pub struct StreamWriter<W> {
    writer: W,
    writable: bool,
}

impl<W> StreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, writable: true }
    }

    /// Returns false once a write failed or the writer was closed.
    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

impl<W> StreamWriter<W>
where
    W: AsyncWrite + Unpin,
{

    pub async fn write(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        if !self.writable {
            return Err(StreamError::Closed);
        }

        trace!(size = bytes.len(), "write bytes");
        let result = async {
            self.writer.write_all(bytes).await?;
            self.writer.flush().await
        }
        .await;

        result.map_err(|e| {
            self.writable = false;
            StreamError::io(e)
        })
    }

    pub async fn write_bytes(&mut self, bytes: Bytes) -> Result<(), StreamError> {
        self.write(&bytes).await
    }

    /// Shuts the transport down. Failures are only logged, the stream is gone either way.
    pub async fn close(&mut self) {
        if !self.writable {
            return;
        }

        self.writable = false;
        if let Err(e) = self.writer.shutdown().await {
            debug!(cause = %e, "shutdown writer failed");
        }
    }
}
