//! Outbound port: raw storage of one serialized document per category.

use crate::domain::{Category, StoreError};

/// Abstract persistence for serialized category documents.
///
/// The store above it owns locking, validation and self-healing; a backend
/// only moves whole documents in and out.
pub trait StateBackend: Send + Sync {
    /// Raw content of a category, or `None` if nothing was ever written.
    fn read(&self, category: Category) -> Result<Option<String>, StoreError>;

    /// Replace the full content of a category.
    fn write(&self, category: Category, contents: &str) -> Result<(), StoreError>;
}
