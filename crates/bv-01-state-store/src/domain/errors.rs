//! State store error types.

use shared_types::VaultError;
use thiserror::Error;

use super::category::Category;

/// Failure reading or writing a category.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {category}: {message}")]
    Io { category: Category, message: String },

    #[error("Serialization error on {category}: {message}")]
    Serialization { category: Category, message: String },
}

impl StoreError {
    pub fn io(category: Category, err: std::io::Error) -> Self {
        StoreError::Io {
            category,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for VaultError {
    fn from(err: StoreError) -> Self {
        VaultError::PersistenceFailure(err.to_string())
    }
}
