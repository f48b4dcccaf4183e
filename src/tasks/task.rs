//! # Task abstraction.
//!
//! This module defines the [`Task`] trait: an async, cancelable remote
//! operation bound to its arguments, with a stable label for logging. The
//! common handle type is [`TaskRef`](crate::tasks::TaskRef), an
//! `Arc<dyn Task>` suitable for sharing across the runtime.
//!
//! A task receives a [`CancellationToken`] and should check it at suspension
//! points so an orchestration-level shutdown unwinds promptly.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::error::CallError;
use crate::tasks::outcome::ResultEntry;

/// Boxed future produced by one task invocation.
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<ResultEntry, CallError>> + Send>>;

/// # Asynchronous, cancelable unit of remote work.
///
/// A `Task` has a stable [`label`](Task::label) and a [`spawn`](Task::spawn)
/// method producing a fresh future per invocation. The launcher invokes each
/// task exactly once per batch; on success the future resolves to the
/// [`ResultEntry`] describing the peer interaction it performed.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use drover::{BoxTaskFuture, CallError, ResultEntry, Task};
///
/// struct Probe;
///
/// impl Task for Probe {
///     fn label(&self) -> &str { "probe" }
///
///     fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
///         Box::pin(async move {
///             if ctx.is_cancelled() {
///                 return Err(CallError::Canceled);
///             }
///             Ok(ResultEntry::new("a", "b", "req-1"))
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task label.
    ///
    /// The label doubles as the provenance tag attached to collected items,
    /// so downstream stages can tell which operation produced an entry.
    fn label(&self) -> &str;

    /// Produces the future for this task's single invocation.
    ///
    /// Implementations should honor `ctx` at suspension points and return
    /// [`CallError::Canceled`] when cancelled.
    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture;
}
