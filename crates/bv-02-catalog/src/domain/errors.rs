//! Catalog error types.
//!
//! "Not found" is never an error here: providers answer it with an empty
//! list or `None`. Everything below means the provider could not answer.

use std::time::Duration;

use shared_types::VaultError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Provider returned status {0}")]
    Status(u16),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Provider call timed out after {}ms", after.as_millis())]
    Timeout { after: Duration },

    #[error("Provider offline")]
    Offline,
}

impl From<CatalogError> for VaultError {
    fn from(err: CatalogError) -> Self {
        VaultError::ProviderUnavailable(err.to_string())
    }
}
