//! # Queue Worker
//!
//! A single-consumer, ordered work queue: the primitive behind the media's
//! dispatch loop. Items are processed strictly one at a time in enqueue
//! order; the per-item future is awaited to completion before the next item
//! is taken, which serializes all downstream handler executions.

use std::future::Future;
use std::sync::Mutex;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Errors from enqueueing into a [`QueueWorker`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkerError {
    /// The worker has been shut down; no further items are accepted.
    #[error("queue worker '{0}' is shut down")]
    ShutDown(&'static str),
}

/// A single-consumer, ordered work queue backed by one background task.
///
/// Shutdown cancels the loop; items still queued at that point are
/// abandoned, not drained.
pub struct QueueWorker<T> {
    name: &'static str,
    tx: mpsc::UnboundedSender<T>,
    cancel: CancellationToken,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> QueueWorker<T> {
    /// Spawns the worker task.
    ///
    /// `process` receives each item together with a child of the worker's
    /// cancellation token; an item that is already being processed runs to
    /// completion even if the worker is shut down meanwhile, so `process`
    /// should observe the token for long-running work.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, Fut>(name: &'static str, mut process: F) -> Self
    where
        F: FnMut(T, CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();
        let cancel = CancellationToken::new();
        let loop_cancel = cancel.clone();

        let handle = tokio::spawn(async move {
            loop {
                let item = tokio::select! {
                    biased;
                    _ = loop_cancel.cancelled() => break,
                    item = rx.recv() => match item {
                        Some(item) => item,
                        None => break,
                    },
                };
                process(item, loop_cancel.child_token()).await;
            }
            debug!(worker = name, "queue worker loop exited");
        });

        Self {
            name,
            tx,
            cancel,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Enqueues an item for processing in arrival order.
    pub fn enqueue(&self, item: T) -> Result<(), WorkerError> {
        if self.cancel.is_cancelled() {
            return Err(WorkerError::ShutDown(self.name));
        }
        self.tx
            .send(item)
            .map_err(|_| WorkerError::ShutDown(self.name))
    }

    /// Stops the worker loop. Items still queued are abandoned. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        if let Ok(mut handle) = self.handle.lock() {
            // The loop observes the token on its own; dropping the join
            // handle here just detaches the finishing task.
            handle.take();
        }
    }

    /// Whether `shutdown` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
