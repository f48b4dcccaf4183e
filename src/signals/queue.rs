//! # Per-kind signal storage.
//!
//! [`SignalQueue`] backs one registered signal kind with two independent
//! views of the same arrivals:
//!
//! - an **unbounded delivery channel** read by blocking waiters
//!   (`wait_for_next`), and
//! - a **bounded history ring** read and pruned by scans
//!   (`scan_and_remove`, `recent`).
//!
//! ## Eviction policy
//! The ring evicts its oldest entry at capacity. Because waiters never read
//! the ring, eviction can only age an event out of *scan* visibility — it
//! can never drop an event out from under a pending blocking wait. History
//! is bounded; delivery is lossless.
//!
//! ## Locking
//! The ring sits behind a std mutex (held only for push/scan, no awaits
//! inside); the delivery receiver sits behind a tokio mutex so one waiter at
//! a time performs the cancellable receive.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::signals::event::SignalEvent;

/// Buffered storage for one signal kind.
pub struct SignalQueue {
    delivery_tx: mpsc::UnboundedSender<SignalEvent>,
    delivery_rx: AsyncMutex<mpsc::UnboundedReceiver<SignalEvent>>,
    ring: Mutex<VecDeque<SignalEvent>>,
    capacity: usize,
}

impl SignalQueue {
    /// Creates a queue whose history ring holds at most `capacity` entries.
    /// `capacity` is floored at 1.
    pub fn new(capacity: usize) -> Self {
        let (delivery_tx, delivery_rx) = mpsc::unbounded_channel();
        Self {
            delivery_tx,
            delivery_rx: AsyncMutex::new(delivery_rx),
            ring: Mutex::new(VecDeque::with_capacity(capacity.max(1))),
            capacity: capacity.max(1),
        }
    }

    /// Records one arrival in both views.
    pub fn push(&self, event: SignalEvent) {
        {
            let mut ring = self.ring.lock().expect("signal ring poisoned");
            if ring.len() == self.capacity {
                ring.pop_front();
            }
            ring.push_back(event.clone());
        }
        // Receiver lives as long as self; send cannot fail.
        let _ = self.delivery_tx.send(event);
    }

    /// Receives the next delivered event; `None` only if the queue is gone.
    pub async fn next_delivered(&self) -> Option<SignalEvent> {
        self.delivery_rx.lock().await.recv().await
    }

    /// Removes and returns the first (oldest) ring entry matching `pred`.
    pub fn take_matching(&self, pred: &dyn Fn(&SignalEvent) -> bool) -> Option<SignalEvent> {
        let mut ring = self.ring.lock().expect("signal ring poisoned");
        let pos = ring.iter().position(pred)?;
        ring.remove(pos)
    }

    /// Snapshot of the current history ring, oldest first.
    pub fn recent(&self) -> Vec<SignalEvent> {
        self.ring.lock().expect("signal ring poisoned").iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ev(kind: &str, id: &str, seq: u64) -> SignalEvent {
        SignalEvent { kind: kind.into(), payload: json!({ "id": id }), seq }
    }

    #[tokio::test]
    async fn ring_evicts_oldest_but_delivery_is_lossless() {
        let q = SignalQueue::new(2);
        q.push(ev("ack", "a", 0));
        q.push(ev("ack", "b", 1));
        q.push(ev("ack", "c", 2));

        // Ring kept only the two newest.
        let recent: Vec<_> = q.recent().into_iter().map(|e| e.seq).collect();
        assert_eq!(recent, vec![1, 2]);

        // Delivery still sees all three, in order.
        assert_eq!(q.next_delivered().await.unwrap().seq, 0);
        assert_eq!(q.next_delivered().await.unwrap().seq, 1);
        assert_eq!(q.next_delivered().await.unwrap().seq, 2);
    }

    #[tokio::test]
    async fn zero_capacity_is_floored_to_one() {
        let q = SignalQueue::new(0);
        q.push(ev("ack", "a", 0));
        q.push(ev("ack", "b", 1));

        let recent = q.recent();
        assert_eq!(recent.len(), 1, "ring must keep the newest entry");
        assert_eq!(recent[0].seq, 1);
    }

    #[tokio::test]
    async fn take_matching_removes_fifo_candidate() {
        let q = SignalQueue::new(8);
        q.push(ev("ack", "x", 0));
        q.push(ev("ack", "y", 1));
        q.push(ev("ack", "y", 2));

        let taken = q
            .take_matching(&|e| e.payload_contains("y"))
            .expect("match expected");
        assert_eq!(taken.seq, 1, "oldest matching entry wins");
        assert_eq!(q.recent().len(), 2);
    }
}
