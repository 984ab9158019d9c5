use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::domain::{Category, StoreError};
use crate::ports::StateBackend;

/// In-memory backend for unit tests.
///
/// Can be told to fail every write, to exercise the store's fail-soft path.
#[derive(Default)]
pub struct MemoryBackend {
    documents: RwLock<HashMap<Category, String>>,
    fail_writes: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a category with raw content, bypassing validation.
    pub fn insert_raw(&self, category: Category, contents: impl Into<String>) {
        self.documents.write().insert(category, contents.into());
    }

    /// Raw content currently held for a category.
    pub fn contents(&self, category: Category) -> Option<String> {
        self.documents.read().get(&category).cloned()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl StateBackend for MemoryBackend {
    fn read(&self, category: Category) -> Result<Option<String>, StoreError> {
        Ok(self.contents(category))
    }

    fn write(&self, category: Category, contents: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Io {
                category,
                message: "simulated write failure".to_string(),
            });
        }
        self.insert_raw(category, contents);
        Ok(())
    }
}
