//! Application services of the catalog subsystem.

pub mod set_catalog;

pub use set_catalog::{refresh_task, SetCatalog, SetListing, LISTING_LIMIT};
