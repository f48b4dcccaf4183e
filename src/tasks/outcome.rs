//! # Per-task results and batch aggregates.
//!
//! [`ResultEntry`] is the durable payload of one successful peer interaction:
//! who initiated it, who received it, when, and the opaque result id a
//! downstream stage needs to act on it (e.g. a request id to accept).
//!
//! [`Outcome`] is the transient per-task result published exactly once on the
//! outcome channel; [`CollectedItem`] is what the collector republishes
//! downstream for `Ok` outcomes; [`BatchReport`] is the aggregate the
//! collector returns.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::CallError;

/// Durable payload of one successful peer-to-peer interaction.
///
/// `sender` and `timestamp` let downstream stages measure end-to-end latency;
/// `receiver` and `result` are what an "accept" stage needs to act.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    /// Peer that initiated the interaction.
    pub sender: Arc<str>,
    /// Peer the interaction targeted.
    pub receiver: Arc<str>,
    /// Unix timestamp in milliseconds, taken when the entry was created.
    pub timestamp: u64,
    /// Opaque result id (e.g. a request id a later stage accepts).
    pub result: String,
}

impl ResultEntry {
    /// Creates an entry stamped with the current wall-clock time.
    pub fn new(
        sender: impl Into<Arc<str>>,
        receiver: impl Into<Arc<str>>,
        result: impl Into<String>,
    ) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            timestamp,
            result: result.into(),
        }
    }
}

/// Result of one task invocation, published exactly once per task.
///
/// Outcomes arrive on the channel in completion order, not launch order.
#[derive(Debug)]
pub enum Outcome {
    /// The task completed and produced an entry.
    Ok {
        /// Label of the task that produced the entry.
        label: Arc<str>,
        /// The produced payload.
        entry: ResultEntry,
    },
    /// The task failed; the error is logged by the collector and dropped.
    Err {
        /// Label of the failed task.
        label: Arc<str>,
        /// The fault.
        error: CallError,
        /// Captured description of the failure (error chain or panic payload).
        ///
        /// Rust has no per-error traceback to attach; this carries the
        /// rendered context a log line needs.
        trace: String,
    },
}

impl Outcome {
    /// Wraps a successful entry.
    pub fn ok(label: impl Into<Arc<str>>, entry: ResultEntry) -> Self {
        Outcome::Ok { label: label.into(), entry }
    }

    /// Wraps a failure, rendering its trace from the error itself.
    pub fn err(label: impl Into<Arc<str>>, error: CallError) -> Self {
        let trace = format!("{error}");
        Outcome::Err { label: label.into(), error, trace }
    }

    /// Wraps a failure with an explicit trace (panic payloads).
    pub fn err_with_trace(
        label: impl Into<Arc<str>>,
        error: CallError,
        trace: impl Into<String>,
    ) -> Self {
        Outcome::Err { label: label.into(), error, trace: trace.into() }
    }

    /// Label of the task that produced this outcome.
    pub fn label(&self) -> &str {
        match self {
            Outcome::Ok { label, .. } | Outcome::Err { label, .. } => label,
        }
    }
}

/// A [`ResultEntry`] tagged with the label of the task that produced it.
///
/// This is the unit republished on the downstream work channel.
#[derive(Clone, Debug)]
pub struct CollectedItem {
    /// Provenance: the label of the producing task.
    pub source: Arc<str>,
    /// The collected payload.
    pub entry: ResultEntry,
}

/// Aggregate counts for one collected batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchReport {
    /// Number of outcomes the collector was told to expect.
    pub expected: usize,
    /// Successful outcomes observed.
    pub ok: usize,
    /// Failed outcomes observed.
    pub err: usize,
}

impl BatchReport {
    /// Total outcomes observed (`ok + err`).
    pub fn observed(&self) -> usize {
        self.ok + self.err
    }

    /// True if every expected outcome arrived.
    pub fn is_complete(&self) -> bool {
        self.observed() == self.expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_is_timestamped() {
        let entry = ResultEntry::new("a", "b", "req-1");
        assert!(entry.timestamp > 0);
        assert_eq!(&*entry.sender, "a");
        assert_eq!(&*entry.receiver, "b");
        assert_eq!(entry.result, "req-1");
    }

    #[test]
    fn outcome_carries_label() {
        let ok = Outcome::ok("send", ResultEntry::new("a", "b", "r"));
        assert_eq!(ok.label(), "send");

        let err = Outcome::err("send", CallError::Canceled);
        assert_eq!(err.label(), "send");
        match err {
            Outcome::Err { trace, .. } => assert!(trace.contains("cancelled")),
            _ => unreachable!(),
        }
    }

    #[test]
    fn report_counts() {
        let report = BatchReport { expected: 10, ok: 7, err: 3 };
        assert_eq!(report.observed(), 10);
        assert!(report.is_complete());
        assert!(!BatchReport { expected: 10, ok: 7, err: 2 }.is_complete());
    }
}
