use std::io;
use std::io::ErrorKind;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::codec::body::LengthEncoder;
use crate::codec::header::HeaderEncoder;
use crate::protocol::{Message, PayloadSize, ResponseHead, SendError};

/// Encodes a response: one header message followed by payload items up to `Eof`.
#[derive(Debug, Default)]
pub struct ResponseEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<LengthEncoder>,
}

impl ResponseEncoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl<D: Buf> Encoder<Message<(ResponseHead, PayloadSize), D>> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, item: Message<(ResponseHead, PayloadSize), D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            Message::Header((head, payload_size)) => {
                if self.payload_encoder.is_some() {
                    error!("expect payload item but receive response head");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                }

                self.header_encoder.encode((head, payload_size), dst)?;
                self.payload_encoder = payload_size.length().map(LengthEncoder::new);
                Ok(())
            }

            Message::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect response header but receive payload item");
                    return Err(io::Error::from(ErrorKind::InvalidInput).into());
                };

                let result = payload_encoder.encode(payload_item, dst);

                if result.is_err() || payload_encoder.is_finish() {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{HeaderLines, PayloadItem};
    use bytes::Bytes;
    use http::StatusCode;

    #[test]
    fn header_then_body() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        let head = ResponseHead::new(StatusCode::OK, HeaderLines::new());
        encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Length(3))), &mut dst).unwrap();
        encoder.encode(Message::<(ResponseHead, PayloadSize)>::from(Bytes::from_static(b"abc")), &mut dst).unwrap();
        encoder.encode(Message::<(ResponseHead, PayloadSize)>::Payload(PayloadItem::Eof), &mut dst).unwrap();

        assert_eq!(&dst[..], b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nabc");
    }

    #[test]
    fn payload_without_header_is_rejected() {
        let mut encoder = ResponseEncoder::new();
        let result = encoder.encode(Message::<(ResponseHead, PayloadSize)>::from(Bytes::from_static(b"abc")), &mut BytesMut::new());
        assert!(matches!(result, Err(SendError::Io { .. })));
    }

    #[test]
    fn encoder_is_reusable_after_eof() {
        let mut encoder = ResponseEncoder::new();
        let mut dst = BytesMut::new();

        for _ in 0..2 {
            let head = ResponseHead::new(StatusCode::NO_CONTENT, HeaderLines::new());
            encoder.encode(Message::<_, Bytes>::Header((head, PayloadSize::Length(0))), &mut dst).unwrap();
            encoder.encode(Message::<(ResponseHead, PayloadSize)>::Payload(PayloadItem::Eof), &mut dst).unwrap();
        }

        assert_eq!(&dst[..], b"HTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\nHTTP/1.1 204 No Content\r\nContent-Length: 0\r\n\r\n");
    }
}
