//! Byte stream adapter.
//!
//! Converts an event driven socket into a sequential read/write contract:
//!
//! - [`StreamReader`]: at most one outstanding read, empty chunk once on clean end
//! - [`StreamEvents`]: the `data` / `end` / `error` entry points of the producer
//! - [`FlowControl`]: pause/resume hooks implementing backpressure
//! - [`StreamWriter`]: writes that complete once the bytes reached the transport
//! - [`spawn_reader`]: feeds the events from any tokio `AsyncRead`

mod adapter;
mod pump;
mod writer;

pub use adapter::FlowControl;
pub use adapter::StreamEvents;
pub use adapter::StreamReader;
pub use adapter::adapter;
pub use pump::PumpHandle;
pub use pump::spawn_reader;
pub use writer::StreamWriter;

#[cfg(test)]
pub(crate) use adapter::tests::recording_adapter;
