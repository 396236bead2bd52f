//! Thread-safe WebSocket manager for topic-based message broadcasting.
//!
//! One Tokio broadcast channel per topic, created lazily on first
//! subscription and dropped once the last subscriber is gone. Delivery is
//! at-least-once from the subscriber's point of view: a lagging receiver may
//! see a `Lagged` gap, and reconnecting clients re-fetch current state, so
//! consumers must merge updates by key rather than appending.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

type Topic = String;
type Sender = broadcast::Sender<String>;
type Receiver = broadcast::Receiver<String>;

const TOPIC_BUFFER: usize = 100;

#[derive(Clone, Default)]
pub struct WebSocketManager {
    inner: Arc<RwLock<HashMap<Topic, Sender>>>,
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `topic`, creating its channel if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_BUFFER).0)
            .subscribe()
    }

    /// Broadcasts `msg` to all subscribers of `topic`.
    ///
    /// A no-op when the topic has never been subscribed to. Topics with no
    /// remaining subscribers are removed after the send.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) {
        let mut map = self.inner.write().await;
        if let Some(sender) = map.get(topic) {
            let _ = sender.send(msg.into());
            if sender.receiver_count() == 0 {
                tracing::debug!("removing topic '{topic}': no subscribers");
                map.remove(topic);
            }
        }
    }

    /// Number of live subscribers on `topic`.
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        let map = self.inner.read().await;
        map.get(topic).map(|s| s.receiver_count()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Duration, timeout};

    #[tokio::test]
    async fn broadcast_reaches_all_subscribers() {
        let mgr = WebSocketManager::new();
        let mut a = mgr.subscribe("t").await;
        let mut b = mgr.subscribe("t").await;

        mgr.broadcast("t", "hello").await;

        let got_a = timeout(Duration::from_millis(100), a.recv()).await.unwrap();
        let got_b = timeout(Duration::from_millis(100), b.recv()).await.unwrap();
        assert_eq!(got_a.unwrap(), "hello");
        assert_eq!(got_b.unwrap(), "hello");
    }

    #[tokio::test]
    async fn broadcast_without_subscribers_is_noop() {
        let mgr = WebSocketManager::new();
        mgr.broadcast("nobody", "hello").await;
        assert_eq!(mgr.subscriber_count("nobody").await, 0);
    }

    #[tokio::test]
    async fn topic_removed_after_last_subscriber_drops() {
        let mgr = WebSocketManager::new();
        let rx = mgr.subscribe("t").await;
        drop(rx);
        mgr.broadcast("t", "x").await;
        assert_eq!(mgr.subscriber_count("t").await, 0);
    }
}
