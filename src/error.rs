//! Error types used by the batch engine, the signal hub, and the retry combinator.
//!
//! This module defines four error enums:
//!
//! - [`CallError`] — faults raised by a single remote operation.
//! - [`LaunchError`] — internal faults in the task launcher.
//! - [`SignalError`] — timeouts and misuse of the signal hub.
//! - [`RetryError`] — terminal results of [`call_with_retry`](crate::retry::call_with_retry).
//!
//! [`CallError`] provides [`CallError::is_retryable`], the allow-list consulted by
//! the retry combinator, plus `as_label` helpers for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Faults raised by a single remote operation.
///
/// These classify what went wrong when invoking one remote call against a
/// peer. Transient variants (`Connection`, `MalformedResponse`,
/// `NotYetAvailable`) are safe to retry against an eventually-consistent
/// remote; the rest are terminal for the attempt.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CallError {
    /// Transport-level failure (connect refused, reset, socket error).
    #[error("connection failed: {reason}")]
    Connection {
        /// The underlying transport error message.
        reason: String,
    },

    /// The peer answered, but the body could not be decoded.
    #[error("malformed response: {reason}")]
    MalformedResponse {
        /// What was wrong with the body.
        reason: String,
    },

    /// The peer answered correctly but the expected state is not visible yet.
    ///
    /// Raised by callers probing an eventually-consistent remote (e.g. a
    /// request id that has not propagated). Retryable by definition.
    #[error("not yet available: {reason}")]
    NotYetAvailable {
        /// What was looked for and not found.
        reason: String,
    },

    /// The peer returned an explicit error object (no retry).
    #[error("remote error: {reason}")]
    Remote {
        /// The error reported by the peer.
        reason: String,
    },

    /// The task body panicked; the payload is carried as text.
    #[error("task panicked: {reason}")]
    Panicked {
        /// Rendered panic payload.
        reason: String,
    },

    /// The operation was cancelled by parent shutdown.
    #[error("operation cancelled")]
    Canceled,
}

impl CallError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CallError::Connection { .. } => "call_connection",
            CallError::MalformedResponse { .. } => "call_malformed_response",
            CallError::NotYetAvailable { .. } => "call_not_yet_available",
            CallError::Remote { .. } => "call_remote",
            CallError::Panicked { .. } => "call_panicked",
            CallError::Canceled => "call_canceled",
        }
    }

    /// Indicates whether the fault is on the transient allow-list.
    ///
    /// Returns `true` for [`CallError::Connection`],
    /// [`CallError::MalformedResponse`] and [`CallError::NotYetAvailable`];
    /// `false` otherwise. This is the only classification consulted by
    /// [`call_with_retry`](crate::retry::call_with_retry).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CallError::Connection { .. }
                | CallError::MalformedResponse { .. }
                | CallError::NotYetAvailable { .. }
        )
    }
}

/// # Internal faults in the task launcher.
///
/// A `LaunchError` means the launcher itself misbehaved while scheduling a
/// batch. Per-task failures are **not** launch errors; they travel as
/// [`Outcome::Err`](crate::tasks::Outcome) values on the result channel.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LaunchError {
    /// A spawned task's join failed: it was torn down from outside (abort)
    /// before it could publish its outcome.
    ///
    /// Panics inside a task body never surface here; they are caught and
    /// published as `Err` outcomes, and `launch` returns `Ok` for them.
    #[error("task '{task}' did not run to completion: {reason}")]
    TaskPanicked {
        /// Label of the offending task.
        task: String,
        /// Join failure description.
        reason: String,
    },
}

impl LaunchError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            LaunchError::TaskPanicked { .. } => "launch_task_panicked",
        }
    }
}

/// # Timeouts and misuse of the signal hub.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SignalError {
    /// No matching event arrived within the allowed time.
    #[error("signal '{kind}' not received within {timeout:?}")]
    Timeout {
        /// The awaited signal kind.
        kind: String,
        /// The timeout that elapsed.
        timeout: Duration,
    },

    /// The signal kind was not registered at hub construction time.
    #[error("signal kind '{kind}' is not in the awaited set")]
    Unregistered {
        /// The offending kind.
        kind: String,
    },
}

impl SignalError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::Timeout { .. } => "signal_timeout",
            SignalError::Unregistered { .. } => "signal_unregistered",
        }
    }
}

/// # Terminal results of the retry combinator.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RetryError {
    /// The time budget ran out; carries the last underlying fault.
    #[error("retry budget {budget:?} exhausted, last error: {last}")]
    BudgetExceeded {
        /// The configured budget that was exceeded.
        budget: Duration,
        /// The error observed on the final attempt.
        last: CallError,
    },

    /// The operation failed with a fault outside the retry allow-list.
    #[error("non-retryable failure: {0}")]
    Fatal(#[source] CallError),
}

impl RetryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RetryError::BudgetExceeded { .. } => "retry_budget_exceeded",
            RetryError::Fatal(_) => "retry_fatal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_allow_list() {
        assert!(CallError::Connection { reason: "refused".into() }.is_retryable());
        assert!(CallError::MalformedResponse { reason: "truncated".into() }.is_retryable());
        assert!(CallError::NotYetAvailable { reason: "no such id".into() }.is_retryable());

        assert!(!CallError::Remote { reason: "bad params".into() }.is_retryable());
        assert!(!CallError::Panicked { reason: "boom".into() }.is_retryable());
        assert!(!CallError::Canceled.is_retryable());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(CallError::Canceled.as_label(), "call_canceled");
        assert_eq!(
            SignalError::Unregistered { kind: "ack".into() }.as_label(),
            "signal_unregistered"
        );
        assert_eq!(
            RetryError::Fatal(CallError::Canceled).as_label(),
            "retry_fatal"
        );
    }
}
