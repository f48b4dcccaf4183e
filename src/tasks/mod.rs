//! # Task abstractions and per-task result types.
//!
//! This module provides the unit-of-work types consumed by the launcher:
//! - [`Task`] - trait for implementing async cancelable remote operations
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`ResultEntry`] - the durable payload of a successful peer interaction
//! - [`Outcome`] - per-task result published on the outcome channel
//! - [`CollectedItem`] - a `ResultEntry` tagged with its provenance label
//! - [`BatchReport`] - aggregate success/failure counts for one batch

mod outcome;
mod task;
mod task_fn;

pub use outcome::{BatchReport, CollectedItem, Outcome, ResultEntry};
pub use task::{BoxTaskFuture, Task};
pub use task_fn::{TaskFn, TaskRef};
