//! # Bounded-time retry for eventually-consistent remotes.
//!
//! [`call_with_retry`] wraps a single remote operation and re-invokes it
//! while it fails with an allow-listed transient fault
//! ([`CallError::is_retryable`]), sleeping [`RetryPolicy::interval`] between
//! attempts, until [`RetryPolicy::budget`] of wall-clock time has elapsed.
//!
//! ## Rules
//! - The first attempt always runs, even with a zero budget.
//! - Non-allow-listed faults propagate immediately as [`RetryError::Fatal`].
//! - Budget exhaustion yields [`RetryError::BudgetExceeded`] carrying the
//!   last underlying fault.
//! - Sleeps are cooperative (`tokio::time::sleep`), never thread-blocking.
//!
//! ## Example
//! ```
//! use std::time::Duration;
//! use drover::{call_with_retry, CallError, RetryPolicy};
//!
//! # async fn demo() {
//! let policy = RetryPolicy {
//!     budget: Duration::from_secs(10),
//!     interval: Duration::from_millis(500),
//! };
//! let value = call_with_retry(|| async { Ok::<_, CallError>(42) }, policy).await;
//! assert_eq!(value.unwrap(), 42);
//! # }
//! ```

use std::future::Future;
use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::debug;

use crate::error::{CallError, RetryError};

/// Time budget and poll interval for one retried operation.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total wall-clock time allowed across all attempts.
    pub budget: Duration,
    /// Sleep between consecutive attempts.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    /// Provides a default policy:
    /// - `budget = 10s`
    /// - `interval = 500ms`
    fn default() -> Self {
        Self {
            budget: Duration::from_secs(10),
            interval: Duration::from_millis(500),
        }
    }
}

/// Invokes `op` until it succeeds, fails non-transiently, or the budget runs
/// out.
///
/// `op` is a factory producing a fresh future per attempt, so each retry
/// re-executes the remote call from scratch.
pub async fn call_with_retry<T, F, Fut>(op: F, policy: RetryPolicy) -> Result<T, RetryError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CallError>>,
{
    let started = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) if !error.is_retryable() => return Err(RetryError::Fatal(error)),
            Err(error) => {
                if started.elapsed() >= policy.budget {
                    return Err(RetryError::BudgetExceeded {
                        budget: policy.budget,
                        last: error,
                    });
                }
                debug!(attempt, error = %error, "transient failure, retrying");
                time::sleep(policy.interval).await;
            }
        }
    }
}
