//! # State Store Service
//!
//! Owns the five categories. Every read-modify-persist runs inside the
//! category's lock, so interactive handlers and the background reconciler
//! never interleave on the same category.
//!
//! ## Failure semantics
//!
//! - Missing, blank or unparseable content (invalid UTF-8 included): the
//!   default record is returned **and written**, the category silently resets.
//! - Partially malformed content: bad entries are dropped, the cleaned record
//!   is written back.
//! - Write failure: logged and swallowed. The caller's in-memory mutation
//!   stands (availability over durability).
//! - Read failure (I/O, e.g. permissions): logged, the default is returned
//!   and `load` writes nothing. The next `update` of that category does
//!   overwrite the file.

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::adapters::{JsonFileBackend, MemoryBackend};
use crate::domain::{Category, CategoryRecord, StoreError, Validated};
use crate::ports::StateBackend;

/// Typed, lock-guarded access to persisted vault state.
pub struct StateStore {
    backend: Arc<dyn StateBackend>,
    locks: [Mutex<()>; 5],
}

impl StateStore {
    pub fn new(backend: Arc<dyn StateBackend>) -> Self {
        Self {
            backend,
            locks: Default::default(),
        }
    }

    /// Store backed by JSON files under `data_dir`.
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Self {
        Self::new(Arc::new(JsonFileBackend::new(data_dir)))
    }

    /// Store backed by memory only.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Fresh, validated read of a category.
    pub fn load<R: CategoryRecord>(&self) -> R {
        let _guard = self.locks[R::CATEGORY.index()].lock();
        self.load_unlocked()
    }

    /// Replace a category's full content. Failures are logged, not returned.
    pub fn save<R: CategoryRecord>(&self, record: &R) {
        let _guard = self.locks[R::CATEGORY.index()].lock();
        self.persist_or_log(record);
    }

    /// Load, mutate and persist a category as one exclusive step.
    ///
    /// `f` must not call back into the store for the same category.
    pub fn update<R, T>(&self, f: impl FnOnce(&mut R) -> T) -> T
    where
        R: CategoryRecord,
    {
        let _guard = self.locks[R::CATEGORY.index()].lock();
        let mut record = self.load_unlocked::<R>();
        let out = f(&mut record);
        self.persist_or_log(&record);
        out
    }

    /// Load every category once, creating missing files with defaults.
    pub fn initialize(&self) {
        use crate::domain::{Badges, Collections, Cooldowns, Stats, Watches};

        let _: Collections = self.load();
        let _: Cooldowns = self.load();
        let _: Watches = self.load();
        let _: Badges = self.load();
        let _: Stats = self.load();
        debug!("[bv-01] All {} categories initialized", Category::ALL.len());
    }

    fn load_unlocked<R: CategoryRecord>(&self) -> R {
        let category = R::CATEGORY;

        let raw = match self.backend.read(category) {
            Ok(raw) => raw,
            Err(e) => {
                error!(category = %category, error = %e, "[bv-01] Read failed, using default");
                return R::default();
            }
        };

        let raw = match raw {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => {
                debug!(category = %category, "[bv-01] No content, writing default");
                return self.reset();
            }
        };

        let value = match serde_json::from_str::<Value>(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(category = %category, error = %e, "[bv-01] Unparseable content, resetting");
                return self.reset();
            }
        };

        match R::from_json(value) {
            Ok(Validated { record, dropped: 0 }) => record,
            Ok(Validated { record, dropped }) => {
                warn!(
                    category = %category,
                    dropped = dropped,
                    "[bv-01] Dropped malformed entries, rewriting cleaned record"
                );
                self.persist_or_log(&record);
                record
            }
            Err(e) => {
                warn!(category = %category, error = %e, "[bv-01] Invalid shape, resetting");
                self.reset()
            }
        }
    }

    fn reset<R: CategoryRecord>(&self) -> R {
        let record = R::default();
        self.persist_or_log(&record);
        record
    }

    fn persist<R: CategoryRecord>(&self, record: &R) -> Result<(), StoreError> {
        let category = R::CATEGORY;
        let contents =
            serde_json::to_string_pretty(record).map_err(|e| StoreError::Serialization {
                category,
                message: e.to_string(),
            })?;
        self.backend.write(category, &contents)
    }

    fn persist_or_log<R: CategoryRecord>(&self, record: &R) {
        if let Err(e) = self.persist(record) {
            error!(
                category = %R::CATEGORY,
                error = %e,
                "[bv-01] Persist failed, keeping in-memory state"
            );
        }
    }
}
