//! # Function-backed task (`TaskFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(CancellationToken) -> Fut`, producing a
//! fresh future per invocation. This avoids shared mutable state between the
//! batch builder and the launcher.
//!
//! ## Concurrency semantics
//! - Each call to [`Task::spawn`] creates a **new** future owning its state.
//! - If tasks need shared state (a connection registry, a counter), capture
//!   an explicit `Arc<...>` inside the closure.
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use drover::{CallError, ResultEntry, TaskFn, TaskRef};
//!
//! let t: TaskRef = TaskFn::arc("send-request", |_ctx: CancellationToken| async move {
//!     Ok::<_, CallError>(ResultEntry::new("node-0", "node-1", "req-42"))
//! });
//!
//! assert_eq!(t.label(), "send-request");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::CallError;
use crate::tasks::outcome::ResultEntry;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Shared handle to a task (`Arc<dyn Task>`).
pub type TaskRef = Arc<dyn Task>;

/// Function-backed task implementation.
///
/// Wraps a closure that *creates* a new future per invocation.
#[derive(Debug)]
pub struct TaskFn<F> {
    label: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`].
    pub fn new(label: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { label: label.into(), f }
    }

    /// Creates the task and returns it as a shared handle (`Arc<dyn Task>`).
    pub fn arc(label: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(label, f))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static, // Fn, not FnMut
    Fut: Future<Output = Result<ResultEntry, CallError>> + Send + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn spawn(&self, ctx: CancellationToken) -> BoxTaskFuture {
        let fut = (self.f)(ctx);
        Box::pin(fut)
    }
}
