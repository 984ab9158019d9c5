//! # BV-05: Collection Queries
//!
//! Read-only views for the front-end: inventory, leaderboard, stats,
//! profile, badges and watch list.

pub mod domain;
pub mod service;

pub use domain::*;
pub use service::CollectionQueries;
