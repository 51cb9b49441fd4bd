use bytes::{Buf, Bytes};

/// Represents an outgoing HTTP message part: either the header or a payload item.
///
/// The generic parameter `T` is the header type, `Data` the payload chunk type
/// (defaults to `Bytes`).
#[derive(Debug)]
pub enum Message<T, Data: Buf = Bytes> {
    /// Contains the header information of type `T`
    Header(T),
    /// Contains a chunk of payload data or EOF marker
    Payload(PayloadItem<Data>),
}

/// Represents an item in the HTTP message payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// The declared length of a body.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    /// Known length in bytes, possibly zero
    Length(u64),
    /// Length not known up front. Only chunked or close-delimited framing could
    /// carry such a body, and neither is supported.
    Unknown,
}

impl PayloadSize {
    /// Returns the known length, if any
    #[inline]
    pub fn length(&self) -> Option<u64> {
        match self {
            PayloadSize::Length(length) => Some(*length),
            PayloadSize::Unknown => None,
        }
    }

    /// Returns true if the payload is known to be empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Length(0))
    }
}

impl<T> From<Bytes> for Message<T> {
    fn from(bytes: Bytes) -> Self {
        Self::Payload(PayloadItem::Chunk(bytes))
    }
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }
}
