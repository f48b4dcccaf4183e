//! # drover
//!
//! **Drover** drives large fleets of independent remote peers through
//! multi-step interaction protocols ("send request" → "accept" → "confirm")
//! while bounding how many requests are in flight, collecting one outcome
//! per task, and synchronizing against push events from the peers.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskRef    │   │   TaskRef    │   │   TaskRef    │
//!     │ (operation 1)│   │ (operation 2)│   │ (operation N)│
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Launcher (ordered start, admission gate, pacing)                 │
//! │  - max_in_flight permits (0 = unbounded)                          │
//! │  - spacing sleep between launches                                 │
//! │  - one Outcome per task, slot released before publish             │
//! └─────────────────────────────┬─────────────────────────────────────┘
//!                               │ Outcome (completion order)
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Collector (counted receive)                                      │
//! │  - Ok  → CollectedItem on the work queue                          │
//! │  - Err → logged, counted, dropped                                 │
//! │  - CompletionSignal set exactly once (drop-guarded)               │
//! └─────────────────────────────┬─────────────────────────────────────┘
//!                               │ CollectedItem … then C sentinels
//!                               ▼
//!                  ┌────────────────────────┐
//!                  │ WorkerPool (C workers) │──► ItemHandler::handle()
//!                  └────────────────────────┘        (e.g. accept + measure,
//!                                                     usually via SignalHub)
//!
//!  push frames ──► listener ──► SignalHub ──► wait_for_next / scan_and_remove
//! ```
//!
//! ### Termination handshake
//! ```text
//! 1. Launcher finishes (or dies) → every outcome sender drops → channel
//!    closes. The close is the terminal marker: the collector can never
//!    block forever on a crashed launcher.
//! 2. Collector reaches expected_count (or sees the close) → sets
//!    CompletionSignal, exactly once, on every exit path.
//! 3. Sentinel injector waits for the signal, then enqueues one Finished
//!    sentinel per worker, behind all republished items (FIFO).
//! 4. Each worker drains items until its sentinel, then exits.
//! ```
//!
//! ## Features
//! | Area            | Description                                                    | Key types / fns                          |
//! |-----------------|----------------------------------------------------------------|------------------------------------------|
//! | **Tasks**       | Define remote operations as trait impls or closures.           | [`Task`], [`TaskFn`], [`TaskRef`]        |
//! | **Batches**     | Paced, admission-gated launch with per-task outcomes.          | [`Launcher`], [`Outcome`], [`Pipeline`]  |
//! | **Collection**  | Counted receive, downstream republish, sentinel handshake.     | [`collect`], [`CompletionSignal`]        |
//! | **Workers**     | Fixed downstream pool over one shared queue.                   | [`WorkerPool`], [`ItemHandler`]          |
//! | **Signals**     | Per-kind buffering of push events, wait + scan under timeout.  | [`SignalHub`], [`spawn_listener`]        |
//! | **Retry**       | Bounded-time retry against eventually-consistent remotes.      | [`call_with_retry`], [`RetryPolicy`]     |
//! | **Errors**      | Typed faults per layer.                                        | [`CallError`], [`LaunchError`], [`SignalError`], [`RetryError`] |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use drover::{
//!     BatchConfig, CallError, CollectedItem, Pipeline, ResultEntry, TaskFn, TaskRef,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut cfg = BatchConfig::default();
//!     cfg.max_in_flight = 5;
//!     cfg.spacing = Duration::from_millis(10);
//!
//!     // One task per (sender, receiver) pair; the closure owns its args.
//!     let tasks: Vec<TaskRef> = (0..10)
//!         .map(|i| {
//!             TaskFn::arc(format!("send-request-{i}"), move |_ctx: CancellationToken| async move {
//!                 // ...perform the remote call here...
//!                 Ok::<_, CallError>(ResultEntry::new(
//!                     format!("node-{i}"),
//!                     "owner",
//!                     format!("request-{i}"),
//!                 ))
//!             }) as TaskRef
//!         })
//!         .collect();
//!
//!     // Downstream stage: act on each successful entry.
//!     let handler = Arc::new(|item: CollectedItem| async move {
//!         let _ = (&item.entry.receiver, &item.entry.result);
//!         // ...accept the request, await its confirmation signal...
//!     });
//!
//!     let report = Pipeline::new(cfg)
//!         .run(tasks, handler, CancellationToken::new())
//!         .await?;
//!     assert_eq!(report.ok, 10);
//!     Ok(())
//! }
//! ```

mod batch;
mod config;
mod error;
mod retry;
mod signals;
mod tasks;

// ---- Public re-exports ----

pub use batch::{
    collect, inject_sentinels, CompletionGuard, CompletionSignal, ItemHandler, Launcher,
    Pipeline, WorkItem, WorkerPool,
};
pub use config::{BatchConfig, HubConfig};
pub use error::{CallError, LaunchError, RetryError, SignalError};
pub use retry::{call_with_retry, RetryPolicy};
pub use signals::{spawn_listener, SignalEvent, SignalHub, SignalQueue};
pub use tasks::{BatchReport, BoxTaskFuture, CollectedItem, Outcome, ResultEntry, Task, TaskFn, TaskRef};
