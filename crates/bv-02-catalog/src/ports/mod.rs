//! Ports layer.

pub mod provider;

pub use provider::CatalogProvider;
