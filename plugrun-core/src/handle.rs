//! Handles to dispatched tasks.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::{Error, Result};

/// A pending or completed invocation of a [`WorkItem`](crate::WorkItem) operation.
///
/// The completion slot is a oneshot channel: the task that ran the operation is
/// its only writer and the owner of the handle its only reader. Waiting consumes
/// the handle, so a result can never be observed twice.
///
/// Dropping a handle without waiting leaves its task running detached.
#[derive(Debug)]
pub struct TaskHandle<T> {
    id: String,
    slot: oneshot::Receiver<Result<T>>,
    task: JoinHandle<()>,
}

impl<T> TaskHandle<T> {
    pub(crate) fn new(id: String, slot: oneshot::Receiver<Result<T>>, task: JoinHandle<()>) -> Self {
        Self { id, slot, task }
    }

    /// Identifier of the work item this handle belongs to.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Waits for the operation to complete, for at most `deadline`.
    ///
    /// Returns the operation's value or error. When the deadline elapses first,
    /// the task is aborted and [`Error::Timeout`] is returned once the abort has
    /// taken effect. By then the operation's future has been dropped, so child
    /// processes spawned with kill-on-drop are already killed. Work detached from
    /// that future (including operations on the blocking pool) keeps running.
    pub async fn wait(self, deadline: Duration) -> Result<T> {
        let Self { id, slot, task } = self;
        match tokio::time::timeout(deadline, slot).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::operation(
                id,
                "task ended without reporting a result (panicked?)",
            )),
            Err(_) => {
                task.abort();
                // Resolves once the future is dropped; the cancellation error is expected.
                let _ = task.await;
                warn!(item = %id, ?deadline, "Task did not complete in time, aborted");
                Err(Error::Timeout { item: id, deadline })
            }
        }
    }
}
