use std::future::Future;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::error::{Result, SummarizerError};

/// Long-running work moved off the interactive context.
///
/// The result is handed back exactly once through [`BackgroundTask::completion`].
/// The worker never sees session state; it only produces a value.
#[derive(Debug)]
pub struct BackgroundTask<T> {
    label: &'static str,
    receiver: Option<oneshot::Receiver<T>>,
    handle: JoinHandle<()>,
}

impl<T: Send + 'static> BackgroundTask<T> {
    /// Spawn `work` on the runtime
    pub fn submit<F>(label: &'static str, work: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let output = work.await;
            // Receiver gone means the task was discarded
            let _ = sender.send(output);
        });
        debug!("Submitted background task: {}", label);

        Self {
            label,
            receiver: Some(receiver),
            handle,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Wait for the result. Cancel-safe, so it can sit in a `select!` loop.
    ///
    /// Returns [`SummarizerError::TaskDiscarded`] if the worker died before
    /// producing a value or the result was already taken.
    pub async fn completion(&mut self) -> Result<T> {
        let receiver = self.receiver.as_mut().ok_or(SummarizerError::TaskDiscarded)?;
        let output = receiver.await.map_err(|_| SummarizerError::TaskDiscarded);
        self.receiver = None;
        output
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Abort the worker and drop any result it may still produce
    pub fn discard(mut self) {
        debug!("Discarding background task: {}", self.label);
        self.receiver = None;
        self.handle.abort();
    }
}
