//! # Decoded push events.
//!
//! [`SignalEvent`] is one message pushed by a remote peer, already decoded
//! and stamped with a monotonic arrival number.
//!
//! ## Ordering guarantees
//! `seq` increases monotonically across **all** kinds in one hub, so it can
//! restore global arrival order even though each kind buffers independently.

use serde_json::Value;
use std::sync::Arc;

/// One push event from a remote peer.
#[derive(Clone, Debug)]
pub struct SignalEvent {
    /// Declared event type (the routing key).
    pub kind: Arc<str>,
    /// Decoded event body.
    pub payload: Value,
    /// Monotonic arrival number assigned by the hub.
    pub seq: u64,
}

impl SignalEvent {
    /// Serializes the payload and tests it for a substring.
    ///
    /// This is the match mode downstream stages use most: "the event that
    /// mentions this request id", without committing to a payload schema.
    pub fn payload_contains(&self, needle: &str) -> bool {
        serde_json::to_string(&self.payload)
            .map(|s| s.contains(needle))
            .unwrap_or(false)
    }
}
