//! # BV-02: Catalog
//!
//! Access to the external card catalog and price service.
//!
//! ## Role
//!
//! - Defines the [`CatalogProvider`] port used by pack opening and price
//!   watching
//! - Ships the Pokémon TCG HTTP adapter, a timeout decorator and an
//!   in-memory adapter
//! - Owns the [`SetCatalog`] cache of known sets, refreshed on a schedule
//!
//! ## Error model
//!
//! | Provider answer | Meaning |
//! |-----------------|---------|
//! | `Ok(vec![])` / `Ok(None)` | set or card unknown upstream |
//! | `Err(CatalogError::Timeout { .. })` | call exceeded its bound |
//! | `Err(_)` (other) | transport, status or decoding failure |
//!
//! ## Module Structure
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      bv-02-catalog                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  application/set_catalog.rs  - SetCatalog, refresh_task     │
//! │  ports/provider.rs           - CatalogProvider trait        │
//! │  adapters/pokemon_tcg.rs     - reqwest client               │
//! │  adapters/timeout.rs         - TimeoutCatalog decorator     │
//! │  adapters/memory.rs          - InMemoryCatalog              │
//! │  domain/errors.rs            - CatalogError                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use adapters::{
    InMemoryCatalog, PokemonTcgClient, PokemonTcgConfig, TimeoutCatalog, DEFAULT_BASE_URL,
};
pub use application::{refresh_task, SetCatalog, SetListing, LISTING_LIMIT};
pub use domain::CatalogError;
pub use ports::CatalogProvider;
