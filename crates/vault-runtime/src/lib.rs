//! # Vault Runtime Library
//!
//! Configuration, subsystem wiring and the [`VaultRuntime`] facade. The
//! `vault-runtime` binary is a thin shell around this library; a chat
//! front-end embeds it the same way.
//!
//! ## Subsystems
//!
//! 1. State Store (bv-01) - JSON persistence
//! 2. Catalog (bv-02) - card/price provider, set cache
//! 3. Pack Opening (bv-03) - cooldown + draw
//! 4. Price Watch (bv-04) - watch lists, reconciliation
//! 5. Collection Queries (bv-05) - read-only views

pub mod container;
pub mod runtime;

pub use container::{ConfigError, SubsystemContainer, VaultConfig};
pub use runtime::{RuntimeError, VaultRuntime};
