//! # SignalHub: registered-kind routing and the two wait modes.
//!
//! The hub owns one [`SignalQueue`] per signal kind registered at
//! construction time. A single listener task feeds it via [`SignalHub::push`];
//! any number of logical tasks consume via [`SignalHub::wait_for_next`] and
//! [`SignalHub::scan_and_remove`].
//!
//! ## Architecture
//! ```text
//!  push channel ──► listener ──► hub.push(kind, payload)
//!                                   │ (registered kinds only)
//!                       ┌───────────┼───────────┐
//!                       ▼           ▼           ▼
//!                  queue "ack"  queue "msg" queue "ready"
//!                   │     │
//!                   │     └── history ring ──► scan_and_remove / recent
//!                   └──────── delivery chan ─► wait_for_next
//! ```
//!
//! ## Rules
//! - The two access modes read **independent views**: a scan never consumes
//!   an event a waiter needs, and vice versa.
//! - `scan_and_remove` removes its match, so an identical second scan does
//!   not re-match it.
//! - Waiting on an unregistered kind is caller error
//!   ([`SignalError::Unregistered`]), not a timeout.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::{self, Instant};
use tracing::debug;

use crate::config::HubConfig;
use crate::error::SignalError;
use crate::signals::event::SignalEvent;
use crate::signals::queue::SignalQueue;

/// Per-kind buffered signal store with blocking-wait and scan access.
pub struct SignalHub {
    queues: HashMap<Arc<str>, SignalQueue>,
    seq: AtomicU64,
    cfg: HubConfig,
}

impl SignalHub {
    /// Creates a hub awaiting the given signal kinds.
    ///
    /// Kinds not in this set are rejected by [`SignalHub::push`]; the
    /// listener logs and discards them.
    pub fn new<I, S>(kinds: I, cfg: HubConfig) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        let queues = kinds
            .into_iter()
            .map(|k| (k.into(), SignalQueue::new(cfg.capacity)))
            .collect();
        Arc::new(Self { queues, seq: AtomicU64::new(0), cfg })
    }

    /// True if `kind` was registered at construction.
    pub fn is_registered(&self, kind: &str) -> bool {
        self.queues.contains_key(kind)
    }

    /// Records one arrival: stamps it with the next sequence number and
    /// stores it in the kind's queue.
    pub fn push(&self, kind: &str, payload: Value) -> Result<(), SignalError> {
        let (registered_kind, queue) = self
            .queues
            .get_key_value(kind)
            .ok_or_else(|| SignalError::Unregistered { kind: kind.to_string() })?;

        let event = SignalEvent {
            kind: Arc::clone(registered_kind),
            payload,
            seq: self.seq.fetch_add(1, AtomicOrdering::Relaxed),
        };
        debug!(kind, seq = event.seq, "signal buffered");
        queue.push(event);
        Ok(())
    }

    /// Blocks until the next event of `kind` arrives, up to `timeout`.
    ///
    /// Consumes from the delivery view only; concurrent scans against the
    /// same kind are unaffected.
    pub async fn wait_for_next(
        &self,
        kind: &str,
        timeout: Duration,
    ) -> Result<SignalEvent, SignalError> {
        let queue = self.queue(kind)?;
        match time::timeout(timeout, queue.next_delivered()).await {
            Ok(Some(event)) => Ok(event),
            // Closed cannot happen while the hub is alive; report as elapse.
            Ok(None) | Err(_) => Err(SignalError::Timeout {
                kind: kind.to_string(),
                timeout,
            }),
        }
    }

    /// Polls recent history for the first event satisfying `pred`, removing
    /// and returning it; fails with [`SignalError::Timeout`] after `timeout`.
    ///
    /// Candidates are matched in FIFO order as of each poll. The poll
    /// interval comes from [`HubConfig::scan_interval`].
    pub async fn scan_and_remove<F>(
        &self,
        kind: &str,
        pred: F,
        timeout: Duration,
    ) -> Result<SignalEvent, SignalError>
    where
        F: Fn(&SignalEvent) -> bool,
    {
        let queue = self.queue(kind)?;
        let deadline = Instant::now() + timeout;

        loop {
            if let Some(event) = queue.take_matching(&pred) {
                debug!(kind, seq = event.seq, "scan matched buffered signal");
                return Ok(event);
            }
            if Instant::now() >= deadline {
                return Err(SignalError::Timeout {
                    kind: kind.to_string(),
                    timeout,
                });
            }
            time::sleep(self.cfg.scan_interval.min(deadline - Instant::now())).await;
        }
    }

    /// Scan for an event whose serialized payload contains `needle`.
    ///
    /// The common downstream idiom: find the confirmation that mentions a
    /// specific request id.
    pub async fn find_containing(
        &self,
        kind: &str,
        needle: &str,
        timeout: Duration,
    ) -> Result<SignalEvent, SignalError> {
        self.scan_and_remove(kind, |e| e.payload_contains(needle), timeout)
            .await
    }

    /// Snapshot of the history ring for `kind`, oldest first.
    pub fn recent(&self, kind: &str) -> Result<Vec<SignalEvent>, SignalError> {
        Ok(self.queue(kind)?.recent())
    }

    fn queue(&self, kind: &str) -> Result<&SignalQueue, SignalError> {
        self.queues
            .get(kind)
            .ok_or_else(|| SignalError::Unregistered { kind: kind.to_string() })
    }
}
