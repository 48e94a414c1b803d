//! Core library for concurrent plugin task orchestration.
//!
//! Work is fanned out with [`dispatch`], one task per [`WorkItem`], and gathered
//! back with [`collect`] into a [`Verdict`]. Flaky one-shot operations go
//! through a [`Retrier`].

pub mod bump;
pub mod collector;
pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handle;
pub mod manifest;
pub mod retry;
pub mod tag;
pub mod work_item;
pub mod workspace;

pub use collector::{collect, collect_with, ItemOutcome, Outcome, Verdict};
pub use command::{CommandOutput, CommandSpec};
pub use config::{Config, PublishConfig, TaskConfig};
pub use dispatcher::dispatch;
pub use error::{Error, Result};
pub use handle::TaskHandle;
pub use manifest::Manifest;
pub use retry::{with_retry, BackoffRange, Retrier, RetryPolicy, RetryState, Sleeper, TokioSleeper};
pub use tag::ReleaseTag;
pub use work_item::{OperationFuture, WorkItem};
pub use workspace::Workspace;
