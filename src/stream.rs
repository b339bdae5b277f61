//! Channel-backed change streams.
//!
//! A stream is a listener that forwards every change it sees into a bounded
//! crossbeam channel. Sends never block the write that produced them: when
//! the channel is full the change is dropped and counted. Once the stream is
//! dropped its listener removes itself on the next delivery attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};

use crate::bus::ListenerId;
use crate::error::{ExecutionError, ModelError, ModelResult};
use crate::event::Change;

const STREAM_NAME: &str = "change_stream";

/// Sending half owned by the listener.
#[derive(Debug)]
pub(crate) struct ChangeSink {
    tx: Sender<Change>,
    dropped: Arc<AtomicU64>,
}

impl ChangeSink {
    /// Forwards a change. Returns false once the receiving stream is gone.
    pub(crate) fn deliver(&self, change: &Change) -> bool {
        match self.tx.try_send(change.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!(path = %change.path, dropped, "change stream full, change dropped");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Receiving end of a change subscription.
#[derive(Debug)]
pub struct ChangeStream {
    listener: ListenerId,
    rx: Receiver<Change>,
    dropped: Arc<AtomicU64>,
}

impl ChangeStream {
    /// Creates a bounded channel. A capacity of zero is raised to one.
    pub(crate) fn channel(capacity: usize) -> (ChangeSink, Receiver<Change>, Arc<AtomicU64>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        let sink = ChangeSink {
            tx,
            dropped: Arc::clone(&dropped),
        };
        (sink, rx, dropped)
    }

    pub(crate) const fn new(listener: ListenerId, rx: Receiver<Change>, dropped: Arc<AtomicU64>) -> Self {
        Self {
            listener,
            rx,
            dropped,
        }
    }

    /// The listener feeding this stream. Pass it to
    /// [`QuoteModel::off`](crate::QuoteModel::off) to stop delivery.
    #[must_use]
    pub const fn listener_id(&self) -> ListenerId {
        self.listener
    }

    /// Number of changes dropped because the stream was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Number of buffered changes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns true if no changes are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Takes the next buffered change, if any.
    #[must_use]
    pub fn try_recv(&self) -> Option<Change> {
        self.rx.try_recv().ok()
    }

    /// Takes every buffered change.
    #[must_use]
    pub fn drain(&self) -> Vec<Change> {
        self.rx.try_iter().collect()
    }

    /// Receive the next change (blocking).
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Disconnected` once the model is gone and the
    /// buffer is empty.
    pub fn recv(&self) -> ModelResult<Change> {
        self.rx.recv().map_err(|_| disconnected())
    }

    /// Receive the next change with a timeout.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Timeout` if nothing arrives in time, or
    /// `ExecutionError::Disconnected` once the model is gone.
    pub fn recv_timeout(&self, timeout: Duration) -> ModelResult<Change> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => ModelError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => disconnected(),
        })
    }
}

fn disconnected() -> ModelError {
    ModelError::Execution(ExecutionError::Disconnected {
        path: STREAM_NAME.to_string(),
    })
}
