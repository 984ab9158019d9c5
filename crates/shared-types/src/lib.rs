//! # Shared Types Crate
//!
//! Domain identifiers, catalog entities, the clock port and the error
//! taxonomy used across the Booster Vault subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type crossing a crate boundary lives here.
//! - **Opaque identity**: users and sets are newtypes, never bare strings.
//! - **Injectable time**: nothing reads the system clock directly; it asks a
//!   [`TimeSource`].

pub mod entities;
pub mod errors;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource};
