//! In-process event bus used to keep connected clients in sync.
//!
//! Publishers never wait for subscribers: events are pushed into a
//! `tokio::sync::broadcast` channel and each subscriber drains its own
//! receiver. A slow subscriber lags and loses the oldest events instead of
//! blocking the request that published them.

use serde::Serialize;
use tokio::sync::broadcast;

/// Topic carrying the full client-visible configuration snapshot.
pub const CONFIG_UPDATED: &str = "config.updated";

/// Topic carrying a human-readable success notification.
pub const NOTIFY_SUCCESS: &str = "notify.success";

const DEFAULT_CAPACITY: usize = 256;

/// A single published event.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AppEvent {
    pub topic: String,
    pub data: serde_json::Value,
}

/// Fan-out publisher shared by every component that emits events.
///
/// Cloning is cheap; all clones publish into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<AppEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        tracing::debug!(capacity, "event bus initialized");
        Self { tx }
    }

    /// Publish `data` under `topic`.
    ///
    /// Returns the number of subscribers that will see the event. Having no
    /// subscribers is not an error.
    pub fn publish<T: Serialize>(&self, topic: &str, data: &T) -> usize {
        let data = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(topic, error = %err, "dropping event with unserializable payload");
                return 0;
            }
        };

        let event = AppEvent {
            topic: topic.to_string(),
            data,
        };

        match self.tx.send(event) {
            Ok(receivers) => {
                tracing::debug!(topic, receivers, "event published");
                receivers
            }
            Err(_) => 0,
        }
    }

    /// Publish a success notification meant to be shown to users.
    pub fn success(&self, message: impl Into<String>) -> usize {
        let message = message.into();
        tracing::info!(%message, "success notification");
        self.publish(NOTIFY_SUCCESS, &serde_json::json!({ "message": message }))
    }

    /// Register a new subscriber. Only events published afterwards are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
