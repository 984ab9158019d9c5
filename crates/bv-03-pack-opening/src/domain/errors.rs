//! Pack opening errors.

use std::time::Duration;

use bv_02_catalog::CatalogError;
use shared_types::{SetId, VaultError};
use thiserror::Error;

use super::cooldown::format_remaining;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackError {
    /// The catalog knows no drawable card for this set.
    #[error("Set {0} not found")]
    SetNotFound(SetId),

    #[error("Next pack available in {}", format_remaining(*remaining))]
    RateLimited { remaining: Duration },

    #[error("Card catalog unavailable: {0}")]
    ProviderUnavailable(#[from] CatalogError),
}

impl From<PackError> for VaultError {
    fn from(err: PackError) -> Self {
        match err {
            PackError::SetNotFound(set) => VaultError::NotFound(format!("set {}", set)),
            PackError::RateLimited { remaining } => VaultError::RateLimited { remaining },
            PackError::ProviderUnavailable(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_uses_minutes_and_seconds() {
        let err = PackError::RateLimited {
            remaining: Duration::from_secs(125),
        };
        assert_eq!(err.to_string(), "Next pack available in 2m5s");
    }

    #[test]
    fn test_taxonomy_mapping() {
        let not_found: VaultError = PackError::SetNotFound(SetId::new("XY1")).into();
        assert_eq!(not_found, VaultError::NotFound("set XY1".into()));

        let offline: VaultError = PackError::from(CatalogError::Offline).into();
        assert!(matches!(offline, VaultError::ProviderUnavailable(_)));
    }
}
