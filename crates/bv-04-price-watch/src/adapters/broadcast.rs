//! # Broadcast Notification Sink
//!
//! Fans notices out over a `tokio::sync::broadcast` channel. A front-end
//! subscribes and delivers each [`DirectMessage`] to its user.
//!
//! Subscribers that fall behind by more than the channel capacity lose the
//! oldest messages (`RecvError::Lagged`).

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use shared_types::UserId;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{DirectMessage, NotifyError, PriceChangeNotice};
use crate::ports::NotificationSink;

/// Default channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

pub struct BroadcastNotificationSink {
    sender: broadcast::Sender<DirectMessage>,
    delivered: AtomicU64,
}

impl Default for BroadcastNotificationSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl BroadcastNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            delivered: AtomicU64::new(0),
        }
    }

    /// New receiver of every notice sent from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DirectMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Notices handed to at least one subscriber.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NotificationSink for BroadcastNotificationSink {
    async fn notify(&self, user: &UserId, notice: &PriceChangeNotice) -> Result<(), NotifyError> {
        let message = DirectMessage {
            user: user.clone(),
            notice: notice.clone(),
        };
        let receivers = self
            .sender
            .send(message)
            .map_err(|_| NotifyError::NoReceivers)?;

        self.delivered.fetch_add(1, Ordering::Relaxed);
        debug!(user = %user, receivers = receivers, "[bv-04] Notice broadcast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> PriceChangeNotice {
        PriceChangeNotice {
            key: "SV1/4".parse().unwrap(),
            old_price: 1.0,
            new_price: 2.0,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_message() {
        let sink = BroadcastNotificationSink::new();
        let mut rx = sink.subscribe();

        sink.notify(&UserId::new("u1"), &notice()).await.unwrap();

        let message = rx.recv().await.unwrap();
        assert_eq!(message.user, UserId::new("u1"));
        assert_eq!(message.notice, notice());
        assert_eq!(sink.delivered(), 1);
    }

    #[tokio::test]
    async fn test_without_subscribers_fails() {
        let sink = BroadcastNotificationSink::new();
        assert_eq!(sink.subscriber_count(), 0);

        let result = sink.notify(&UserId::new("u1"), &notice()).await;

        assert_eq!(result, Err(NotifyError::NoReceivers));
        assert_eq!(sink.delivered(), 0);
    }
}
