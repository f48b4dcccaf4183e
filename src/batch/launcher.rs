//! # Launcher: paced, admission-gated batch execution.
//!
//! Starts an ordered batch of tasks, each exactly once, publishing one
//! [`Outcome`] per task on the result channel.
//!
//! ## Rules
//! - Tasks start in input order; outcomes arrive in **completion** order.
//! - `max_in_flight > 0` bounds concurrency via a semaphore permit acquired
//!   before each start and released when the task finishes.
//! - The permit is released **before** the outcome is published, so a slot
//!   frees up even if the outcome channel is momentarily full.
//! - Panics inside a task body are caught and published as `Err` outcomes;
//!   `launch` itself still returns `Ok` for them.
//!   [`LaunchError::TaskPanicked`] covers only join failures (a task aborted
//!   from outside), where no outcome was published.
//! - Cancellation stops starting new tasks; in-flight tasks still publish.
//!
//! ## Architecture
//! ```text
//! launch(tasks, outcomes, token)
//!
//! for task in tasks {
//!   ├─► acquire admission permit   (cancellable)
//!   ├─► spawn run_task(task, permit, outcomes)
//!   └─► sleep(spacing)             (cancellable)
//! }
//! join all spawned tasks
//!
//! run_task:
//!   task.spawn(ctx) ──catch_unwind──► result
//!   drop(permit)            // slot free before publish
//!   outcomes.send(Outcome)  // exactly one per task
//! ```
//!
//! When `launch` returns, every clone of the outcome sender created for this
//! batch has been dropped. The channel close that follows is the terminal
//! marker collectors rely on, so a launcher fault can never strand them.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{CallError, LaunchError};
use crate::tasks::{Outcome, TaskRef};

/// Paced, admission-gated task launcher for one batch.
#[derive(Clone, Debug)]
pub struct Launcher {
    /// Delay after starting each task before considering the next.
    pub spacing: Duration,
    /// Concurrency ceiling (0 = unbounded).
    pub max_in_flight: usize,
}

impl Launcher {
    /// Creates a launcher with the given pacing and ceiling.
    pub fn new(spacing: Duration, max_in_flight: usize) -> Self {
        Self { spacing, max_in_flight }
    }

    /// Builds the admission gate if `max_in_flight > 0`; otherwise no cap.
    fn build_gate(&self) -> Option<Arc<Semaphore>> {
        match self.max_in_flight {
            0 => None,
            n => Some(Arc::new(Semaphore::new(n))),
        }
    }

    /// Runs the batch: starts every task in order, waits for all of them to
    /// finish publishing, and reports the first internal fault, if any.
    ///
    /// Exactly one [`Outcome`] is published per *started* task. Tasks not yet
    /// started when `token` fires are skipped (their outcomes never existed;
    /// the collector observes the channel close instead).
    pub async fn launch(
        &self,
        tasks: Vec<TaskRef>,
        outcomes: mpsc::Sender<Outcome>,
        token: CancellationToken,
    ) -> Result<(), LaunchError> {
        let gate = self.build_gate();
        let mut set: JoinSet<Arc<str>> = JoinSet::new();

        for task in tasks {
            if token.is_cancelled() {
                warn!("launch cancelled; skipping remaining tasks");
                break;
            }

            let permit = match &gate {
                Some(gate) => {
                    let acquired = gate.clone().acquire_owned();
                    tokio::pin!(acquired);
                    tokio::select! {
                        res = &mut acquired => match res {
                            Ok(permit) => Some(permit),
                            Err(_closed) => break,
                        },
                        _ = token.cancelled() => {
                            warn!("launch cancelled while waiting for admission");
                            break;
                        }
                    }
                }
                None => None,
            };

            debug!(task = task.label(), "launching task");
            let tx = outcomes.clone();
            let ctx = token.child_token();
            set.spawn(run_task(task, permit, tx, ctx));

            if self.spacing > Duration::ZERO {
                let sleep = tokio::time::sleep(self.spacing);
                tokio::pin!(sleep);
                tokio::select! {
                    _ = &mut sleep => {}
                    _ = token.cancelled() => {
                        warn!("launch cancelled during spacing sleep");
                        break;
                    }
                }
            }
        }
        // The collector watches for this channel to close once all per-task
        // senders are gone.
        drop(outcomes);

        let mut fault: Option<LaunchError> = None;
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(label) => debug!(task = %label, "task settled"),
                Err(join_err) => {
                    let err = LaunchError::TaskPanicked {
                        task: "<unknown>".into(),
                        reason: join_err.to_string(),
                    };
                    warn!(error = %err, "task join failed");
                    fault.get_or_insert(err);
                }
            }
        }

        match fault {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Executes one task, releases its admission slot, publishes its outcome.
async fn run_task(
    task: TaskRef,
    permit: Option<OwnedSemaphorePermit>,
    outcomes: mpsc::Sender<Outcome>,
    ctx: CancellationToken,
) -> Arc<str> {
    let label: Arc<str> = Arc::from(task.label());

    let result = AssertUnwindSafe(task.spawn(ctx)).catch_unwind().await;

    // Slot free before publish: a slow outcome channel must not hold up
    // admission of the next task.
    drop(permit);

    let outcome = match result {
        Ok(Ok(entry)) => Outcome::ok(label.clone(), entry),
        Ok(Err(error)) => Outcome::err(label.clone(), error),
        Err(panic) => {
            let reason = panic_message(panic);
            Outcome::err_with_trace(
                label.clone(),
                CallError::Panicked { reason: reason.clone() },
                reason,
            )
        }
    };

    if outcomes.send(outcome).await.is_err() {
        warn!(task = %label, "outcome channel closed; dropping outcome");
    }
    label
}

/// Renders a panic payload into a printable string.
fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{ResultEntry, TaskFn};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ok_task(label: &'static str, delay: Duration) -> TaskRef {
        TaskFn::arc(label, move |_ctx| async move {
            tokio::time::sleep(delay).await;
            Ok(ResultEntry::new("s", "r", label))
        })
    }

    #[tokio::test]
    async fn one_outcome_per_task_in_completion_order() {
        let launcher = Launcher::new(Duration::ZERO, 0);
        let (tx, mut rx) = mpsc::channel(16);

        let tasks = vec![
            ok_task("slow", Duration::from_millis(50)),
            ok_task("fast", Duration::from_millis(5)),
        ];
        launcher
            .launch(tasks, tx, CancellationToken::new())
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.label(), "fast");
        assert_eq!(second.label(), "slow");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn admission_gate_bounds_concurrency() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut tasks: Vec<TaskRef> = Vec::new();
        for i in 0..20 {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            tasks.push(TaskFn::arc(format!("task-{i}"), move |_ctx| {
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                async move {
                    let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    Ok(ResultEntry::new("s", "r", "x"))
                }
            }));
        }

        let launcher = Launcher::new(Duration::ZERO, 3);
        let (tx, mut rx) = mpsc::channel(32);
        launcher
            .launch(tasks, tx, CancellationToken::new())
            .await
            .unwrap();

        let mut seen = 0;
        while rx.recv().await.is_some() {
            seen += 1;
        }
        assert_eq!(seen, 20);
        assert!(peak.load(Ordering::SeqCst) <= 3, "peak was {}", peak.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failures_are_published_not_dropped() {
        let tasks: Vec<TaskRef> = vec![
            ok_task("good", Duration::ZERO),
            TaskFn::arc("bad", |_ctx| async move {
                Err::<ResultEntry, _>(CallError::Remote { reason: "boom".into() })
            }),
        ];

        let launcher = Launcher::new(Duration::ZERO, 0);
        let (tx, mut rx) = mpsc::channel(8);
        launcher
            .launch(tasks, tx, CancellationToken::new())
            .await
            .unwrap();

        let mut ok = 0;
        let mut err = 0;
        while let Some(outcome) = rx.recv().await {
            match outcome {
                Outcome::Ok { .. } => ok += 1,
                Outcome::Err { .. } => err += 1,
            }
        }
        assert_eq!((ok, err), (1, 1));
    }

    #[tokio::test]
    async fn panics_become_err_outcomes() {
        let tasks: Vec<TaskRef> = vec![TaskFn::arc("exploder", |_ctx| async move {
            panic!("kapow");
            #[allow(unreachable_code)]
            Ok(ResultEntry::new("s", "r", "x"))
        })];

        let launcher = Launcher::new(Duration::ZERO, 0);
        let (tx, mut rx) = mpsc::channel(8);
        launcher
            .launch(tasks, tx, CancellationToken::new())
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Outcome::Err { error, trace, .. } => {
                assert_eq!(error.as_label(), "call_panicked");
                assert!(trace.contains("kapow"));
            }
            other => panic!("expected Err outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_skips_unstarted_tasks() {
        let token = CancellationToken::new();
        token.cancel();

        let launcher = Launcher::new(Duration::ZERO, 0);
        let (tx, mut rx) = mpsc::channel(8);
        launcher
            .launch(vec![ok_task("never", Duration::ZERO)], tx, token)
            .await
            .unwrap();

        // Nothing started, channel just closes.
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn cancellation_mid_batch_lets_in_flight_publish() {
        let token = CancellationToken::new();
        let tasks: Vec<TaskRef> = (0..5)
            .map(|_| ok_task("paced", Duration::from_millis(100)))
            .collect();

        let launcher = Launcher::new(Duration::ZERO, 2);
        let (tx, mut rx) = mpsc::channel(8);
        let handle = tokio::spawn({
            let token = token.clone();
            async move { launcher.launch(tasks, tx, token).await }
        });

        // The first outcome means the first admitted pair is finishing and
        // the launcher is back at the admission gate for the tail.
        assert!(rx.recv().await.is_some());
        token.cancel();

        handle.await.unwrap().unwrap();

        let mut published = 1;
        while rx.recv().await.is_some() {
            published += 1;
        }
        assert!(published >= 2, "in-flight tasks must still publish, saw {published}");
        assert!(published < 5, "unstarted tasks must be skipped, saw {published}");
    }
}
