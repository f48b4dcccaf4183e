//! # Pipeline: wiring one launcher/collector stage.
//!
//! [`Pipeline`] is thin composition glue. It owns no logic of its own: it
//! builds the channels, spawns the launcher, the collector, the sentinel
//! injector, and the worker pool under one cancellation tree, then joins
//! everything and returns the batch report.
//!
//! ## High-level architecture
//! ```text
//! run(tasks, handler, token)
//!
//!   Launcher ──Outcome──► Collector ──CollectedItem──► [work queue] ──► WorkerPool
//!      │                     │                              ▲
//!      │                     └── done: CompletionSignal ────┘
//!      │                              (sentinel injector)
//!      └── channel close on exit = terminal marker for the collector
//! ```
//!
//! Cancelling `token` propagates into the launcher loop, every in-flight
//! task, and (via the resulting channel closures) the collector and pool —
//! no component needs a second teardown path.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::batch::collector::{collect, inject_sentinels};
use crate::batch::completion::CompletionSignal;
use crate::batch::launcher::Launcher;
use crate::batch::workers::{ItemHandler, WorkItem, WorkerPool};
use crate::config::BatchConfig;
use crate::error::LaunchError;
use crate::tasks::{BatchReport, TaskRef};

/// One launcher → collector → worker-pool stage.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    cfg: BatchConfig,
}

impl Pipeline {
    /// Creates a pipeline with the given batch configuration.
    pub fn new(cfg: BatchConfig) -> Self {
        Self { cfg }
    }

    /// Runs one batch to completion.
    ///
    /// Spawns the four pieces, joins them all, and returns the aggregate
    /// report. A launcher-internal fault wins over the report; the
    /// completion handshake has already run by the time it surfaces, so
    /// nothing downstream is left blocked.
    pub async fn run(
        &self,
        tasks: Vec<TaskRef>,
        handler: Arc<dyn ItemHandler>,
        token: CancellationToken,
    ) -> Result<BatchReport, LaunchError> {
        let expected = tasks.len();
        let (out_tx, out_rx) = mpsc::channel(self.cfg.outcome_capacity);
        let (work_tx, work_rx) = mpsc::channel::<WorkItem>(self.cfg.downstream_capacity);
        let done = CompletionSignal::new();

        let launcher = Launcher::new(self.cfg.spacing, self.cfg.max_in_flight);
        let launch = tokio::spawn({
            let token = token.clone();
            async move { launcher.launch(tasks, out_tx, token).await }
        });

        let collector = tokio::spawn(collect(out_rx, work_tx.clone(), expected, done.clone()));
        let injector = tokio::spawn(inject_sentinels(done, work_tx, self.cfg.workers));
        let pool = WorkerPool::spawn(work_rx, self.cfg.workers, handler);

        let launch_result = match launch.await {
            Ok(res) => res,
            Err(join_err) => Err(LaunchError::TaskPanicked {
                task: "<launcher>".into(),
                reason: join_err.to_string(),
            }),
        };

        let report = match collector.await {
            Ok(report) => report,
            Err(join_err) => {
                warn!(error = %join_err, "collector join failed");
                BatchReport { expected, ok: 0, err: 0 }
            }
        };
        let _ = injector.await;
        pool.join().await;

        launch_result.map(|()| report)
    }
}
