//! Fan-out of work items onto concurrent tasks.

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::Error;
use crate::handle::TaskHandle;
use crate::work_item::{Operation, WorkItem};

/// Launches one task per item and returns their handles without waiting.
///
/// Every item starts immediately; there is no concurrency cap, so this is meant
/// for small lists such as the workspaces of a repository. Handles are returned
/// in input order whatever order the tasks finish in. Failures are never
/// reported here, only through the corresponding handle.
///
/// # Panics
///
/// Panics when called outside a tokio runtime.
pub fn dispatch<T: Send + 'static>(items: Vec<WorkItem<T>>) -> Vec<TaskHandle<T>> {
    items.into_iter().map(spawn_item).collect()
}

fn spawn_item<T: Send + 'static>(item: WorkItem<T>) -> TaskHandle<T> {
    let (id, operation) = item.into_parts();
    let (tx, rx) = oneshot::channel();

    debug!(item = %id, "Dispatching task");
    let task_id = id.clone();
    let task = tokio::spawn(async move {
        let result = match operation {
            Operation::Async(run) => run().await,
            Operation::Blocking(run) => match tokio::task::spawn_blocking(run).await {
                Ok(result) => result,
                Err(e) => Err(Error::operation(
                    task_id,
                    format!("blocking task failed: {}", e),
                )),
            },
        };
        // The receiver is gone when the waiter gave up; nothing left to report to.
        let _ = tx.send(result);
    });

    TaskHandle::new(id, rx, task)
}
