//! Drives the adapter's events from a tokio [`AsyncRead`].
//!
//! The pump owns the read half of the socket and turns it into `data`, `end` and
//! `error` events. It only reads while the adapter has resumed it, so an idle
//! connection leaves bytes in the kernel instead of in user space.

use std::sync::Arc;

use futures::StreamExt;
use tokio::io::AsyncRead;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;
use tracing::trace;

use crate::protocol::StreamError;
use crate::stream::adapter::{FlowControl, StreamEvents, StreamReader, adapter};

/// Flow control backed by a watch flag: `true` means the pump may read.
#[derive(Debug)]
struct WatchFlow {
    running: watch::Sender<bool>,
}

impl FlowControl for WatchFlow {
    fn pause(&self) {
        self.running.send_replace(false);
    }

    fn resume(&self) {
        self.running.send_replace(true);
    }
}

/// Aborts the pump task when dropped, force-closing the read side.
#[derive(Debug)]
pub struct PumpHandle {
    task: JoinHandle<()>,
}

impl PumpHandle {
    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task feeding `reader` into a new adapter and returns its read side.
///
/// Must be called within a tokio runtime.
pub fn spawn_reader<R>(reader: R, chunk_size: usize) -> (StreamReader, PumpHandle)
where
    R: AsyncRead + Send + Unpin + 'static,
{
    let (running, resumed) = watch::channel(false);
    let (stream_reader, events) = adapter(Arc::new(WatchFlow { running }));

    let task = tokio::spawn(pump(ReaderStream::with_capacity(reader, chunk_size), events, resumed));

    (stream_reader, PumpHandle { task })
}

async fn pump<R>(mut source: ReaderStream<R>, events: StreamEvents, mut resumed: watch::Receiver<bool>)
where
    R: AsyncRead + Unpin,
{
    loop {
        if resumed.wait_for(|running| *running).await.is_err() {
            // the adapter is gone, nobody will read again
            return;
        }

        match source.next().await {
            Some(Ok(bytes)) => {
                trace!(size = bytes.len(), "receive data event");
                events.on_data(bytes);
            }
            Some(Err(e)) => {
                events.on_error(StreamError::io(e));
                return;
            }
            None => {
                trace!("receive end event");
                events.on_end();
                return;
            }
        }
    }
}
