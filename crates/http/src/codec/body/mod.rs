//! HTTP body encoding.
//!
//! Only content-length framing exists: [`LengthEncoder`] copies body chunks and
//! verifies the body matches its declared length.

mod length_encoder;

pub use length_encoder::LengthEncoder;
