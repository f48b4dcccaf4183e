//! # Batch engine: launch, collect, hand off.
//!
//! This module contains the bounded-concurrency orchestration core:
//! - [`launcher`]: starts tasks in order under an admission gate and pacing,
//!   publishing one [`Outcome`](crate::tasks::Outcome) per task;
//! - [`collector`]: counted receive of outcomes, downstream republish, and
//!   the post-completion sentinel handshake;
//! - [`workers`]: the fixed downstream worker pool reading the shared queue;
//! - [`completion`]: the idempotent per-batch completion signal;
//! - [`pipeline`]: thin glue wiring all of the above under one cancellation
//!   tree.

mod collector;
mod completion;
mod launcher;
mod pipeline;
mod workers;

pub use collector::{collect, inject_sentinels};
pub use completion::{CompletionGuard, CompletionSignal};
pub use launcher::Launcher;
pub use pipeline::Pipeline;
pub use workers::{ItemHandler, WorkItem, WorkerPool};
