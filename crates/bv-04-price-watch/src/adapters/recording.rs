use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::UserId;

use crate::domain::{DirectMessage, NotifyError, PriceChangeNotice};
use crate::ports::NotificationSink;

#[derive(Default)]
struct Behaviour {
    failing: bool,
    delay: Option<Duration>,
}

/// Keeps every notice in memory. Can be made to fail or stall.
#[derive(Default)]
pub struct RecordingNotificationSink {
    sent: Mutex<Vec<DirectMessage>>,
    behaviour: Mutex<Behaviour>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<DirectMessage> {
        self.sent.lock().clone()
    }

    pub fn take(&self) -> Vec<DirectMessage> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn set_failing(&self, failing: bool) {
        self.behaviour.lock().failing = failing;
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        self.behaviour.lock().delay = delay;
    }
}

#[async_trait]
impl NotificationSink for RecordingNotificationSink {
    async fn notify(&self, user: &UserId, notice: &PriceChangeNotice) -> Result<(), NotifyError> {
        let (failing, delay) = {
            let behaviour = self.behaviour.lock();
            (behaviour.failing, behaviour.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if failing {
            return Err(NotifyError::Rejected(format!("cannot message {}", user)));
        }

        self.sent.lock().push(DirectMessage {
            user: user.clone(),
            notice: notice.clone(),
        });
        Ok(())
    }
}
