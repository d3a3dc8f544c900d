use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::domains::notifications::models::Notification;

/// Notification Hub
///
/// Per-user broadcast channels keyed by user id. Constructed once in
/// AppState and passed to the realtime handler and to dispatch collaborators
/// explicitly; replaces the ambient app-level registry pattern with
/// dependency injection.
///
/// Channels are created lazily on first subscribe and pruned once the last
/// subscriber disconnects.
#[derive(Clone)]
pub struct NotificationHub {
    channels: Arc<RwLock<HashMap<u64, broadcast::Sender<Notification>>>>,
    capacity: usize,
}

impl NotificationHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
            capacity,
        }
    }

    /// Deterministic channel name for a user
    pub fn channel_name(user_id: u64) -> String {
        format!("user_{}", user_id)
    }

    /// Join a user's channel, creating it if this is the first subscriber
    pub async fn subscribe(&self, user_id: u64) -> broadcast::Receiver<Notification> {
        let mut channels = self.channels.write().await;
        channels
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Deliver a notification to every live connection of a user. Returns
    /// the number of connections reached; zero (nobody online) is not an
    /// error.
    pub async fn publish(&self, user_id: u64, notification: Notification) -> usize {
        let channels = self.channels.read().await;
        match channels.get(&user_id) {
            Some(sender) => sender.send(notification).unwrap_or(0),
            None => 0,
        }
    }

    /// Drop the channel if its last subscriber is gone. Called on
    /// disconnect.
    pub async fn prune(&self, user_id: u64) {
        let mut channels = self.channels.write().await;
        if let Some(sender) = channels.get(&user_id) {
            if sender.receiver_count() == 0 {
                channels.remove(&user_id);
            }
        }
    }

    /// Whether a user currently has a live channel (diagnostics/tests)
    pub async fn has_channel(&self, user_id: u64) -> bool {
        self.channels.read().await.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_deterministic_per_user() {
        assert_eq!(NotificationHub::channel_name(7), "user_7");
        assert_eq!(NotificationHub::channel_name(7), NotificationHub::channel_name(7));
    }

    #[tokio::test]
    async fn publish_reaches_only_that_users_subscribers() {
        let hub = NotificationHub::new(8);

        let mut alice = hub.subscribe(1).await;
        let mut bob = hub.subscribe(2).await;

        let reached = hub.publish(1, Notification::new("friend_request", "hi")).await;
        assert_eq!(reached, 1);

        let received = alice.recv().await.unwrap();
        assert_eq!(received.kind, "friend_request");
        assert!(bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_reaches_nobody() {
        let hub = NotificationHub::new(8);
        assert_eq!(hub.publish(9, Notification::new("x", "y")).await, 0);
        assert!(!hub.has_channel(9).await);
    }

    #[tokio::test]
    async fn prune_removes_channel_after_last_disconnect() {
        let hub = NotificationHub::new(8);

        let rx = hub.subscribe(3).await;
        assert!(hub.has_channel(3).await);

        drop(rx);
        hub.prune(3).await;
        assert!(!hub.has_channel(3).await);
    }
}
