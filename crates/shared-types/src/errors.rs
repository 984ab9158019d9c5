//! # Error Types
//!
//! The error taxonomy every subsystem maps its local failures onto.
//!
//! | Kind | Surfaced to user | Handling |
//! |------|------------------|----------|
//! | `NotFound` | yes | non-retryable without different input |
//! | `RateLimited` | yes, with remaining time | self-resolving |
//! | `PersistenceFailure` | no | logged; in-memory effect stands |
//! | `ProviderUnavailable` | only when it aborts the whole request | skipped for that unit of work |

use std::time::Duration;

use thiserror::Error;

/// Cross-subsystem error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    /// Requested set or card is absent upstream.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Cooldown still active.
    #[error("Rate limited: retry in {}s", remaining.as_secs())]
    RateLimited { remaining: Duration },

    /// Local read or write of persisted state failed.
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    /// External provider call failed or timed out.
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),
}

impl VaultError {
    /// Whether the front-end should render this error to the user.
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            VaultError::NotFound(_)
                | VaultError::RateLimited { .. }
                | VaultError::ProviderUnavailable(_)
        )
    }
}
