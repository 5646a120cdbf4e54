//! The single serial execution context of a screen. Every reference callback
//! and every UI action of that screen runs here, one job at a time, in the
//! order jobs were posted.

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::CoreError;

pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Handle to a serial job executor running on a tokio task.
///
/// Jobs must not block: they run on the runtime's worker threads.
#[derive(Clone, Debug)]
pub struct DeliveryQueue {
    tx: mpsc::UnboundedSender<Job>,
    cancel: CancellationToken,
}

impl DeliveryQueue {
    /// Start a queue on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    job = rx.recv() => {
                        let Some(job) = job else { break };
                        job();
                    }
                }
            }
            debug!("delivery queue stopped");
        });

        Self { tx, cancel }
    }

    pub(crate) fn post(&self, job: Job) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::QueueClosed);
        }
        self.tx.send(job).map_err(|_| CoreError::QueueClosed)
    }

    /// Run `f` on the queue without waiting for it.
    pub fn run<F>(&self, f: F) -> Result<(), CoreError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.post(Box::new(f))
    }

    /// Run `f` on the queue and wait for its result.
    pub async fn call<F, R>(&self, f: F) -> Result<R, CoreError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.post(Box::new(move || {
            let _ = tx.send(f());
        }))?;
        rx.await.map_err(|_| CoreError::QueueClosed)
    }

    /// Wait until every job posted before this call has run.
    pub async fn flush(&self) -> Result<(), CoreError> {
        self.call(|| ()).await
    }

    /// Stop executing jobs. Jobs still queued are dropped without running.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
