//! # Downstream worker pool.
//!
//! A fixed pool of workers consuming [`CollectedItem`]s from one shared FIFO
//! queue and applying an [`ItemHandler`] to each (e.g. "accept this request
//! and record the latency"). Workers keep reading until they see their
//! terminal [`WorkItem::Finished`] sentinel, injected by
//! [`inject_sentinels`](crate::batch::inject_sentinels) once the producing
//! batch has completed.
//!
//! ## Diagram
//! ```text
//!                 [ shared work queue (FIFO) ]
//!                   │          │          │
//!                worker 1   worker 2 … worker C
//!                   │          │          │
//!             handler.handle(item)  (one item at a time per worker)
//! ```
//!
//! tokio's mpsc receiver is single-consumer, so the pool shares it behind an
//! async mutex; the lock is held only across a single `recv`, never across
//! handler execution.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::debug;

use crate::tasks::CollectedItem;

/// One unit on the downstream work channel.
#[derive(Debug)]
pub enum WorkItem {
    /// A collected entry to process.
    Item(CollectedItem),
    /// Terminal sentinel: the reading worker must exit its loop.
    Finished,
}

/// Contract for downstream item processing.
///
/// Called from pool workers. Implementations may be slow (remote calls,
/// signal waits); they hold up only their own worker, never the queue lock.
#[async_trait]
pub trait ItemHandler: Send + Sync + 'static {
    /// Processes a single collected item.
    async fn handle(&self, item: CollectedItem);
}

#[async_trait]
impl<F, Fut> ItemHandler for F
where
    F: Fn(CollectedItem) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, item: CollectedItem) {
        (self)(item).await;
    }
}

/// Fixed pool of workers draining one shared work queue.
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawns `workers` tasks reading from `rx` and applying `handler`.
    ///
    /// Each worker exits on its [`WorkItem::Finished`] sentinel or when the
    /// channel closes with no sentinel (producer torn down).
    pub fn spawn(
        rx: mpsc::Receiver<WorkItem>,
        workers: usize,
        handler: Arc<dyn ItemHandler>,
    ) -> Self {
        let rx = Arc::new(Mutex::new(rx));
        let mut set = JoinSet::new();

        for id in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let handler = Arc::clone(&handler);
            set.spawn(async move {
                loop {
                    // Hold the lock only for the receive itself.
                    let next = { rx.lock().await.recv().await };
                    match next {
                        Some(WorkItem::Item(item)) => handler.handle(item).await,
                        Some(WorkItem::Finished) => {
                            debug!(worker = id, "worker finished");
                            break;
                        }
                        None => break,
                    }
                }
            });
        }

        Self { workers: set }
    }

    /// Waits for every worker to exit.
    pub async fn join(mut self) {
        while self.workers.join_next().await.is_some() {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::ResultEntry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn item(id: &str) -> WorkItem {
        WorkItem::Item(CollectedItem {
            source: "send".into(),
            entry: ResultEntry::new("s", "r", id),
        })
    }

    #[tokio::test]
    async fn pool_processes_all_items_then_stops() {
        let processed = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = mpsc::channel(32);

        let counter = processed.clone();
        let handler = Arc::new(move |_item: CollectedItem| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let pool = WorkerPool::spawn(rx, 3, handler);

        for i in 0..10 {
            tx.send(item(&format!("req-{i}"))).await.unwrap();
        }
        for _ in 0..3 {
            tx.send(WorkItem::Finished).await.unwrap();
        }

        pool.join().await;
        assert_eq!(processed.load(Ordering::SeqCst), 10);
    }

    #[tokio::test]
    async fn pool_exits_on_channel_close() {
        let (tx, rx) = mpsc::channel(4);
        let handler = Arc::new(|_item: CollectedItem| async move {});
        let pool = WorkerPool::spawn(rx, 2, handler);
        drop(tx);
        pool.join().await; // must not hang
    }
}
