//! # Inbound signal listener.
//!
//! One task per peer connection: receives raw frames from the push
//! transport, decodes the `{"type": ..., "event": ...}` envelope, and routes
//! each event to the hub. It is the **sole writer** of the hub's queues.
//!
//! ## Rules
//! - Malformed frames are logged and discarded; the listener keeps running.
//! - Events of unregistered kinds are logged and discarded, never buffered.
//! - The listener exits on cancellation or when the source channel closes,
//!   releasing nothing but itself (the hub outlives it).

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::signals::hub::SignalHub;

/// Envelope of one raw push frame.
#[derive(Debug, Deserialize)]
struct RawSignal {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    event: Value,
}

/// Spawns the single decoding listener for one push channel.
///
/// `source` is the raw frame stream (one JSON text frame per message, the
/// shape the push transport delivers).
pub fn spawn_listener(
    hub: Arc<SignalHub>,
    mut source: mpsc::Receiver<String>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!("signal listener started");
        loop {
            let frame = tokio::select! {
                _ = token.cancelled() => break,
                frame = source.recv() => match frame {
                    Some(frame) => frame,
                    None => break,
                },
            };

            let raw: RawSignal = match serde_json::from_str(&frame) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(%err, "discarding malformed signal frame");
                    continue;
                }
            };

            if hub.push(&raw.kind, raw.event).is_err() {
                debug!(kind = %raw.kind, "ignored signal not in awaited set");
            }
        }
        debug!("signal listener stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;
    use std::time::Duration;

    fn hub() -> Arc<SignalHub> {
        SignalHub::new(["ack"], HubConfig::default())
    }

    #[tokio::test]
    async fn routes_registered_kinds_to_the_hub() {
        let hub = hub();
        let (tx, rx) = mpsc::channel(8);
        let token = CancellationToken::new();
        let listener = spawn_listener(Arc::clone(&hub), rx, token.clone());

        tx.send(r#"{"type":"ack","event":{"id":"req-1"}}"#.to_string())
            .await
            .unwrap();

        let event = hub
            .wait_for_next("ack", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(event.payload_contains("req-1"));

        token.cancel();
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn survives_garbage_and_unsolicited_kinds() {
        let hub = hub();
        let (tx, rx) = mpsc::channel(8);
        let listener = spawn_listener(Arc::clone(&hub), rx, CancellationToken::new());

        tx.send("not json at all".to_string()).await.unwrap();
        tx.send(r#"{"type":"gossip","event":{}}"#.to_string()).await.unwrap();
        tx.send(r#"{"type":"ack","event":{"id":"after-garbage"}}"#.to_string())
            .await
            .unwrap();

        let event = hub
            .wait_for_next("ack", Duration::from_secs(1))
            .await
            .unwrap();
        assert!(event.payload_contains("after-garbage"));
        assert!(hub.recent("ack").unwrap().len() == 1);

        drop(tx);
        listener.await.unwrap();
    }

    #[tokio::test]
    async fn exits_on_source_close() {
        let hub = hub();
        let (tx, rx) = mpsc::channel::<String>(1);
        let listener = spawn_listener(hub, rx, CancellationToken::new());
        drop(tx);
        listener.await.unwrap();
    }
}
