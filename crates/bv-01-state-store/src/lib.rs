//! # BV-01: State Store
//!
//! Typed key-value persistence for the five vault categories: collections,
//! cooldowns, watches, badges and stats.
//!
//! ## Contract
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `load::<R>()` | fresh validated read; missing/corrupt content resets to default and is persisted |
//! | `save(&r)` | full replace of the category, failures logged |
//! | `update(f)` | load → `f` → save under the category lock |
//!
//! ## Module Structure
//!
//! ```text
//! service.rs           - StateStore (per-category locks, self-healing load)
//! domain/category.rs   - Category enum, file names
//! domain/records.rs    - Collections, Cooldowns, Watches, Badges, Stats + validation
//! ports/backend.rs     - StateBackend trait
//! adapters/file.rs     - JsonFileBackend (atomic temp-file writes)
//! adapters/memory.rs   - MemoryBackend (tests)
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{JsonFileBackend, MemoryBackend};
pub use domain::*;
pub use ports::StateBackend;
pub use service::StateStore;
