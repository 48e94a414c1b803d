//! Units of orchestrated work.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::Result;

/// Boxed future produced by a work item's operation.
pub type OperationFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'static>>;

pub(crate) enum Operation<T> {
    Async(Box<dyn FnOnce() -> OperationFuture<T> + Send + 'static>),
    Blocking(Box<dyn FnOnce() -> Result<T> + Send + 'static>),
}

/// One workspace (or any other opaque identifier) paired with the operation to
/// run for it.
///
/// The operation is consumed when the item is dispatched.
pub struct WorkItem<T> {
    id: String,
    operation: Operation<T>,
}

impl<T: Send + 'static> WorkItem<T> {
    /// Creates an item whose operation is asynchronous.
    pub fn new<F, Fut>(id: impl Into<String>, operation: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        Self {
            id: id.into(),
            operation: Operation::Async(Box::new(move || Box::pin(operation()))),
        }
    }

    /// Creates an item whose operation blocks the calling thread.
    ///
    /// Such operations run on the blocking thread pool so they never stall the
    /// other in-flight items.
    pub fn blocking<F>(id: impl Into<String>, operation: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            id: id.into(),
            operation: Operation::Blocking(Box::new(operation)),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    pub(crate) fn into_parts(self) -> (String, Operation<T>) {
        (self.id, self.operation)
    }
}

impl<T> fmt::Debug for WorkItem<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.operation {
            Operation::Async(_) => "async",
            Operation::Blocking(_) => "blocking",
        };
        f.debug_struct("WorkItem")
            .field("id", &self.id)
            .field("operation", &kind)
            .finish()
    }
}
