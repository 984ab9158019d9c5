//! # Subsystem Container
//!
//! Configuration and dependency injection for the vault subsystems.

pub mod config;
pub mod subsystems;

pub use config::{ConfigError, VaultConfig};
pub use subsystems::SubsystemContainer;
