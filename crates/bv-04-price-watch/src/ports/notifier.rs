//! Outbound port for price change notifications.

use async_trait::async_trait;
use shared_types::UserId;

use crate::domain::{NotifyError, PriceChangeNotice};

/// Delivers a notice to one user (a DM in the chat front-end).
///
/// Callers bound every call with a timeout; implementations need not.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, user: &UserId, notice: &PriceChangeNotice) -> Result<(), NotifyError>;
}
