//! Price watch errors.

use std::time::Duration;

use bv_02_catalog::CatalogError;
use shared_types::{CardKey, VaultError};
use thiserror::Error;

/// Failure of a user-facing watch operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("Card {0} not found")]
    CardNotFound(CardKey),

    #[error("Card catalog unavailable: {0}")]
    ProviderUnavailable(#[from] CatalogError),
}

impl From<WatchError> for VaultError {
    fn from(err: WatchError) -> Self {
        match err {
            WatchError::CardNotFound(key) => VaultError::NotFound(format!("card {}", key)),
            WatchError::ProviderUnavailable(e) => e.into(),
        }
    }
}

/// A notification could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("No receiver is listening for notifications")]
    NoReceivers,

    #[error("Notification timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("Notification rejected: {0}")]
    Rejected(String),
}
