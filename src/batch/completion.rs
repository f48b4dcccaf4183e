//! # Per-batch completion signal.
//!
//! [`CompletionSignal`] is a clonable, single-set, idempotent event meaning
//! "no more outcomes will be produced by this batch". It fires exactly once
//! per batch regardless of success, partial failure, or cancellation.
//!
//! The signal is a thin wrapper over [`CancellationToken`], which already has
//! the right semantics: idempotent set, many waiters, cheap clones. The
//! [`CompletionSignal::set_on_drop`] guard is how the collector guarantees
//! the signal fires even if its own future is dropped mid-flight.

use tokio_util::sync::{CancellationToken, DropGuard};

/// Single-set, idempotent completion event shared across a batch.
#[derive(Clone, Debug, Default)]
pub struct CompletionSignal {
    token: CancellationToken,
}

impl CompletionSignal {
    /// Creates a fresh, unset signal.
    pub fn new() -> Self {
        Self { token: CancellationToken::new() }
    }

    /// Sets the signal. Safe to call more than once; only the first call
    /// transitions state.
    pub fn set(&self) {
        self.token.cancel();
    }

    /// True once the signal has been set.
    pub fn is_set(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Waits until the signal is set. Returns immediately if already set.
    pub async fn wait(&self) {
        self.token.cancelled().await;
    }

    /// Returns a guard that sets the signal when dropped.
    ///
    /// Holding the guard across a task body turns "return, error, or drop"
    /// into the same terminal transition. Call [`CompletionGuard::disarm`]
    /// only if some other path is guaranteed to set the signal.
    pub fn set_on_drop(&self) -> CompletionGuard {
        CompletionGuard { guard: self.token.clone().drop_guard() }
    }
}

/// Guard that sets its [`CompletionSignal`] when dropped.
#[derive(Debug)]
pub struct CompletionGuard {
    guard: DropGuard,
}

impl CompletionGuard {
    /// Releases the guard without setting the signal.
    pub fn disarm(self) {
        let _ = self.guard.disarm();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_is_idempotent() {
        let done = CompletionSignal::new();
        assert!(!done.is_set());
        done.set();
        done.set();
        assert!(done.is_set());
        done.wait().await; // returns immediately once set
    }

    #[tokio::test]
    async fn guard_fires_on_drop() {
        let done = CompletionSignal::new();
        {
            let _guard = done.set_on_drop();
            assert!(!done.is_set());
        }
        assert!(done.is_set());
    }

    #[tokio::test]
    async fn disarmed_guard_does_not_fire() {
        let done = CompletionSignal::new();
        let guard = done.set_on_drop();
        guard.disarm();
        assert!(!done.is_set());
    }

    #[tokio::test]
    async fn waiters_unblock_on_set() {
        let done = CompletionSignal::new();
        let waiter = {
            let done = done.clone();
            tokio::spawn(async move { done.wait().await })
        };
        done.set();
        waiter.await.unwrap();
    }
}
