//! # BV-03: Pack Opening
//!
//! Rate-limited, randomized pack allocation.
//!
//! ## Flow
//!
//! ```text
//! open_pack(user, set)
//!   │
//!   ├─ cooldown check ─────────── Denied ──► RateLimited
//!   ├─ catalog.list_cards(set) ── Err ─────► ProviderUnavailable
//!   ├─ draw_pack (6/3/1) ──────── empty ───► SetNotFound
//!   ├─ cooldown re-check + record (Cooldowns lock)
//!   └─ collection += cards, stats.openers += 1, grant "first-pack"
//! ```
//!
//! Failed openings write nothing.

pub mod application;
pub mod domain;

pub use application::{PackOpening, PackOpeningConfig, PackOpeningService};
pub use domain::*;
