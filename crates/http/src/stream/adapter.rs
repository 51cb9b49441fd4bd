//! Push to pull adapter for the read side of a byte stream.
//!
//! The transport pushes `data`, `end` and `error` events through [`StreamEvents`];
//! the connection pulls chunks with [`StreamReader::read`]. Both sides funnel every
//! transition through the single [`ReadState`] record, so whichever event arrives
//! first decides the next state.
//!
//! Backpressure: each delivered data event pauses the producer through
//! [`FlowControl::pause`], and only a new `read()` resumes it. At most one event's
//! worth of bytes is buffered per connection.

use std::fmt;
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::{Bytes, BytesMut};
use futures::channel::oneshot;
use tracing::{debug, trace};

use crate::protocol::StreamError;

/// Producer side backpressure hooks.
pub trait FlowControl: Send + Sync {
    /// Stop delivering data events until [`resume`](FlowControl::resume).
    fn pause(&self);

    /// Deliver data events again.
    fn resume(&self);
}

type ReadResult = Result<Bytes, StreamError>;

enum ReadState {
    /// No read pending. `backlog` holds bytes that arrived in between.
    Idle { backlog: BytesMut },
    /// A read is suspended waiting for the next event.
    Waiting(oneshot::Sender<ReadResult>),
    /// The peer closed cleanly. The empty chunk is handed out exactly once.
    Ended { backlog: BytesMut, eof_delivered: bool },
    /// Sticky transport failure.
    Errored(StreamError),
}

impl Default for ReadState {
    fn default() -> Self {
        ReadState::Idle { backlog: BytesMut::new() }
    }
}

impl fmt::Debug for ReadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadState::Idle { backlog } => f.debug_struct("Idle").field("backlog", &backlog.len()).finish(),
            ReadState::Waiting(_) => f.write_str("Waiting"),
            ReadState::Ended { backlog, eof_delivered } => {
                f.debug_struct("Ended").field("backlog", &backlog.len()).field("eof_delivered", eof_delivered).finish()
            }
            ReadState::Errored(e) => f.debug_tuple("Errored").field(e).finish(),
        }
    }
}

struct Shared {
    state: Mutex<ReadState>,
    flow: Arc<dyn FlowControl>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, ReadState> {
        // a poisoned lock only means a panic elsewhere, the state itself stays consistent
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Creates the two sides of a stream adapter sharing one state record.
pub fn adapter(flow: Arc<dyn FlowControl>) -> (StreamReader, StreamEvents) {
    let shared = Arc::new(Shared { state: Mutex::new(ReadState::default()), flow });
    (StreamReader { shared: Arc::clone(&shared) }, StreamEvents { shared })
}

/// Demand-driven read side. Only one read may be outstanding at a time.
pub struct StreamReader {
    shared: Arc<Shared>,
}

impl StreamReader {
    /// Returns the next chunk of bytes.
    ///
    /// An empty chunk is returned exactly once, when the peer has closed the stream
    /// cleanly; reading again after that fails with [`StreamError::Closed`]. Calling
    /// `read` while a previous read has not completed fails with
    /// [`StreamError::ReadPending`].
    pub async fn read(&self) -> Result<Bytes, StreamError> {
        let receiver = {
            let mut state = self.shared.lock();
            match &mut *state {
                ReadState::Errored(e) => return Err(e.clone()),

                ReadState::Waiting(sender) if !sender.is_canceled() => return Err(StreamError::ReadPending),

                ReadState::Idle { backlog } | ReadState::Ended { backlog, .. } if !backlog.is_empty() => {
                    return Ok(backlog.split().freeze());
                }

                ReadState::Ended { eof_delivered, .. } => {
                    if *eof_delivered {
                        return Err(StreamError::Closed);
                    }
                    *eof_delivered = true;
                    return Ok(Bytes::new());
                }

                // idle with nothing buffered, or a pending read whose caller went away
                ReadState::Idle { .. } | ReadState::Waiting(_) => {}
            }

            let (sender, receiver) = oneshot::channel();
            *state = ReadState::Waiting(sender);
            receiver
        };

        self.shared.flow.resume();

        receiver.await.unwrap_or(Err(StreamError::Closed))
    }
}

impl fmt::Debug for StreamReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamReader").field("state", &*self.shared.lock()).finish()
    }
}

/// Event side, fed by whatever owns the transport.
#[derive(Clone)]
pub struct StreamEvents {
    shared: Arc<Shared>,
}

impl StreamEvents {
    /// A chunk of bytes arrived. Pauses the producer until the next read.
    pub fn on_data(&self, bytes: Bytes) {
        if bytes.is_empty() {
            return;
        }

        let mut state = self.shared.lock();
        match mem::take(&mut *state) {
            ReadState::Waiting(sender) => {
                self.shared.flow.pause();
                if let Err(Ok(bytes)) = sender.send(Ok(bytes)) {
                    // the pending read was dropped, keep the bytes for the next one
                    *state = ReadState::Idle { backlog: BytesMut::from(&bytes[..]) };
                }
            }
            ReadState::Idle { mut backlog } => {
                self.shared.flow.pause();
                backlog.extend_from_slice(&bytes);
                *state = ReadState::Idle { backlog };
            }
            other => {
                trace!(size = bytes.len(), "drop data event after end of stream");
                *state = other;
            }
        }
    }

    /// The peer closed the stream cleanly.
    pub fn on_end(&self) {
        let mut state = self.shared.lock();
        *state = match mem::take(&mut *state) {
            ReadState::Waiting(sender) => match sender.send(Ok(Bytes::new())) {
                Ok(()) => ReadState::Ended { backlog: BytesMut::new(), eof_delivered: true },
                Err(_) => ReadState::Ended { backlog: BytesMut::new(), eof_delivered: false },
            },
            ReadState::Idle { backlog } => ReadState::Ended { backlog, eof_delivered: false },
            other => other,
        };
    }

    /// The transport failed. The first error is kept and replayed to every read.
    pub fn on_error(&self, error: StreamError) {
        let mut state = self.shared.lock();
        *state = match mem::take(&mut *state) {
            ReadState::Waiting(sender) => {
                debug!(cause = %error, "stream error while read pending");
                let _ = sender.send(Err(error.clone()));
                ReadState::Errored(error)
            }
            errored @ ReadState::Errored(_) => errored,
            _ => ReadState::Errored(error),
        };
    }
}

impl fmt::Debug for StreamEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEvents").finish_non_exhaustive()
    }
}
