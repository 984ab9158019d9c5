use async_trait::async_trait;
use shared_types::UserId;
use tracing::info;

use crate::domain::{NotifyError, PriceChangeNotice};
use crate::ports::NotificationSink;

/// Writes notices to the log. Used when no front-end is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

#[async_trait]
impl NotificationSink for LogNotificationSink {
    async fn notify(&self, user: &UserId, notice: &PriceChangeNotice) -> Result<(), NotifyError> {
        info!(
            user = %user,
            key = %notice.key,
            old_price = notice.old_price,
            new_price = notice.new_price,
            "[bv-04] {}",
            notice
        );
        Ok(())
    }
}
