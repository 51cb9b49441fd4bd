use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};

/// Encodes a body of declared length, checking it yields exactly that many bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    finished: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, finished: false }
    }

    pub fn is_finish(&self) -> bool {
        self.finished
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining() as u64;
                if size > self.length {
                    return Err(SendError::invalid_body(format!("body exceeds declared length by {} bytes", size - self.length)));
                }

                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let n = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(n);
                }
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof => {
                if self.length > 0 {
                    return Err(SendError::invalid_body(format!("body ended {} bytes short of declared length", self.length)));
                }
                self.finished = true;
                Ok(())
            }
        }
    }
}
