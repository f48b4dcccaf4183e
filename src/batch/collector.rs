//! # Collector: counted receive and the two-step termination handshake.
//!
//! [`collect`] drains the outcome channel, republishes successful entries on
//! the downstream work channel, and sets the batch [`CompletionSignal`]
//! exactly once. [`inject_sentinels`] performs the second step of the
//! handshake: after completion fires, it enqueues one terminal
//! [`WorkItem::Finished`] per downstream worker.
//!
//! ## Termination protocol
//! ```text
//! Phase 1 — production complete:
//!   collect() reads outcomes until expected_count is reached, or until the
//!   channel closes (the launcher and every per-task sender dropped — the
//!   structured "finally" marker). Either way, `done` is set exactly once.
//!
//! Phase 2 — consumption complete:
//!   inject_sentinels() waits for `done`, then sends one Finished sentinel
//!   per worker. The work channel is FIFO, so every republished item is
//!   already queued ahead of the sentinels: a worker that reads a sentinel
//!   has no items left ahead of it and can exit its loop.
//! ```
//!
//! Signaling termination before `done` would lose work; never signaling
//! would deadlock the pool. The ordering above is the only safe interleaving.
//!
//! ## Rules
//! - `Err` outcomes are logged with their trace and **counted**, never
//!   forwarded; a batch is reported with aggregate counts, not aborted on
//!   first error.
//! - `done` fires even if the collector future is dropped mid-flight
//!   (drop guard taken at entry).

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::batch::completion::CompletionSignal;
use crate::batch::workers::WorkItem;
use crate::tasks::{BatchReport, CollectedItem, Outcome};

/// Drains `expected` outcomes, republishing `Ok` entries downstream.
///
/// Returns the aggregate [`BatchReport`]. Sets `done` exactly once on every
/// exit path, including early upstream death (channel close) and drop.
pub async fn collect(
    mut outcomes: mpsc::Receiver<Outcome>,
    downstream: mpsc::Sender<WorkItem>,
    expected: usize,
    done: CompletionSignal,
) -> BatchReport {
    // Fires even if this future is dropped before finishing.
    let _guard = done.set_on_drop();

    let mut ok = 0usize;
    let mut err = 0usize;

    while ok + err < expected {
        match outcomes.recv().await {
            Some(Outcome::Ok { label, entry }) => {
                ok += 1;
                debug!(task = %label, result = %entry.result, "task completed");
                let item = CollectedItem { source: label, entry };
                if downstream.send(WorkItem::Item(item)).await.is_err() {
                    warn!("downstream channel closed; dropping collected item");
                }
            }
            Some(Outcome::Err { label, error, trace }) => {
                err += 1;
                error!(task = %label, %error, "task failed\n{trace}");
            }
            None => {
                warn!(
                    observed = ok + err,
                    expected, "outcome channel closed before expected count"
                );
                break;
            }
        }
    }

    done.set();
    info!(expected, ok, err, "batch collection finished");
    BatchReport { expected, ok, err }
}

/// Second handshake step: waits for `done`, then enqueues one terminal
/// sentinel per downstream worker.
///
/// FIFO ordering of the work channel guarantees the sentinels land behind
/// every item the collector republished, so no work is lost.
pub async fn inject_sentinels(
    done: CompletionSignal,
    downstream: mpsc::Sender<WorkItem>,
    workers: usize,
) {
    done.wait().await;
    debug!(workers, "injecting terminal sentinels");
    for _ in 0..workers {
        if downstream.send(WorkItem::Finished).await.is_err() {
            // Pool already gone; remaining sentinels are moot.
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::tasks::ResultEntry;

    fn ok_outcome(label: &str, id: &str) -> Outcome {
        Outcome::ok(label, ResultEntry::new("s", "r", id))
    }

    #[tokio::test]
    async fn counts_ok_and_err_toward_expected() {
        let (out_tx, out_rx) = mpsc::channel(8);
        let (work_tx, mut work_rx) = mpsc::channel(8);
        let done = CompletionSignal::new();

        out_tx.send(ok_outcome("send", "a")).await.unwrap();
        out_tx
            .send(Outcome::err("send", CallError::Remote { reason: "nope".into() }))
            .await
            .unwrap();
        out_tx.send(ok_outcome("send", "b")).await.unwrap();

        let report = collect(out_rx, work_tx, 3, done.clone()).await;
        assert_eq!(report, BatchReport { expected: 3, ok: 2, err: 1 });
        assert!(done.is_set());

        // Only Ok entries were republished.
        let mut forwarded = Vec::new();
        while let Ok(item) = work_rx.try_recv() {
            if let WorkItem::Item(item) = item {
                forwarded.push(item.entry.result);
            }
        }
        assert_eq!(forwarded, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn channel_close_is_a_terminal_marker() {
        let (out_tx, out_rx) = mpsc::channel(8);
        let (work_tx, _work_rx) = mpsc::channel(8);
        let done = CompletionSignal::new();

        out_tx.send(ok_outcome("send", "only")).await.unwrap();
        drop(out_tx); // upstream died before producing the rest

        let report = collect(out_rx, work_tx, 5, done.clone()).await;
        assert_eq!(report.observed(), 1);
        assert!(!report.is_complete());
        assert!(done.is_set(), "completion must fire on upstream death");
    }

    #[tokio::test]
    async fn done_fires_if_collector_is_dropped() {
        let (_out_tx, out_rx) = mpsc::channel::<Outcome>(8);
        let (work_tx, _work_rx) = mpsc::channel(8);
        let done = CompletionSignal::new();

        let handle = tokio::spawn(collect(out_rx, work_tx, 1, done.clone()));
        tokio::task::yield_now().await;
        handle.abort();
        let _ = handle.await;

        assert!(done.is_set());
    }

    #[tokio::test]
    async fn sentinels_queue_behind_items() {
        let (work_tx, mut work_rx) = mpsc::channel(8);
        let done = CompletionSignal::new();

        work_tx
            .send(WorkItem::Item(CollectedItem {
                source: "send".into(),
                entry: ResultEntry::new("s", "r", "a"),
            }))
            .await
            .unwrap();
        done.set();
        inject_sentinels(done, work_tx, 2).await;

        assert!(matches!(work_rx.recv().await, Some(WorkItem::Item(_))));
        assert!(matches!(work_rx.recv().await, Some(WorkItem::Finished)));
        assert!(matches!(work_rx.recv().await, Some(WorkItem::Finished)));
    }
}
