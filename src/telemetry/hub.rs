//! Fan-out of snapshot batches to subscriber channels.

use crate::error::Result;
use crate::telemetry::data::FeedMessage;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch, RwLock};
use tracing::debug;

/// Bookkeeping for one connected subscriber.
#[derive(Debug, Clone)]
struct Subscriber {
    connected_at: DateTime<Utc>,
}

/// Delivers each tick's snapshot batch to every open subscriber channel.
///
/// The envelope is serialized once per tick; all channels receive the same
/// payload. Each channel forwards independently, so a failed or slow
/// subscriber never blocks delivery to the others. The hub holds no observer
/// state beyond an opaque connection id used for logging.
///
/// Cloning the hub is cheap; all clones share the same channel set.
/// [`BroadcastHub::close`] releases every open channel, for shutdown.
#[derive(Debug, Clone)]
pub struct BroadcastHub {
    tx: broadcast::Sender<Arc<str>>,
    subscribers: Arc<RwLock<HashMap<String, Subscriber>>>,
    closed_tx: Arc<watch::Sender<bool>>,
}

impl BroadcastHub {
    /// Create a hub whose per-channel queue holds up to `capacity` payloads.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        let (closed_tx, _closed_rx) = watch::channel(false);
        Self {
            tx,
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            closed_tx: Arc::new(closed_tx),
        }
    }

    /// Open a new subscriber channel.
    ///
    /// The receiver sees every payload published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<str>> {
        self.tx.subscribe()
    }

    /// Signal observed by per-channel forwarding tasks; fires once on
    /// [`BroadcastHub::close`].
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.closed_tx.subscribe()
    }

    /// Release every open subscriber channel.
    pub fn close(&self) {
        let _ = self.closed_tx.send(true);
    }

    /// Record a subscriber as connected.
    pub async fn register(&self, connection_id: &str) {
        let mut subscribers = self.subscribers.write().await;
        subscribers.insert(
            connection_id.to_string(),
            Subscriber {
                connected_at: Utc::now(),
            },
        );
    }

    /// Remove a subscriber; no further sends are attempted for it.
    pub async fn unregister(&self, connection_id: &str) {
        let mut subscribers = self.subscribers.write().await;
        if let Some(subscriber) = subscribers.remove(connection_id) {
            debug!(
                connection_id,
                connected_at = %subscriber.connected_at,
                "subscriber removed"
            );
        }
    }

    /// Number of currently registered subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Serialize a feed message once and deliver it to every open channel.
    ///
    /// Returns the number of channels the payload was queued for. Zero open
    /// channels is not an error.
    pub fn publish(&self, message: &FeedMessage) -> Result<usize> {
        let payload: Arc<str> = Arc::from(message.to_json()?);
        let delivered = self.tx.send(payload).unwrap_or(0);
        Ok(delivered)
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::data::FeedMessage;

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let hub = BroadcastHub::new(8);
        let delivered = hub
            .publish(&FeedMessage::update(vec![], Utc::now()))
            .unwrap();
        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn subscribers_receive_the_serialized_payload() {
        let hub = BroadcastHub::new(8);
        let mut rx_a = hub.subscribe();
        let mut rx_b = hub.subscribe();

        let message = FeedMessage::update(vec![], Utc::now());
        let delivered = hub.publish(&message).unwrap();
        assert_eq!(delivered, 2);

        let payload_a = rx_a.recv().await.unwrap();
        let payload_b = rx_b.recv().await.unwrap();
        assert_eq!(payload_a, payload_b);
        assert_eq!(FeedMessage::from_json(&payload_a).unwrap(), message);
    }

    #[tokio::test]
    async fn register_and_unregister_track_membership() {
        let hub = BroadcastHub::default();
        assert_eq!(hub.subscriber_count().await, 0);

        hub.register("conn-1").await;
        hub.register("conn-2").await;
        assert_eq!(hub.subscriber_count().await, 2);

        hub.unregister("conn-1").await;
        assert_eq!(hub.subscriber_count().await, 1);

        // Unknown ids are a no-op.
        hub.unregister("conn-9").await;
        assert_eq!(hub.subscriber_count().await, 1);
    }

    #[tokio::test]
    async fn close_signal_reaches_all_clones() {
        let hub = BroadcastHub::new(8);
        let clone = hub.clone();
        let mut closed = clone.closed();

        hub.close();
        closed.changed().await.expect("close signal");
        assert!(*closed.borrow());
    }
}
