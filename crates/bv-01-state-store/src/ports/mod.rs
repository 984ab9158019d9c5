//! Ports layer.

pub mod backend;

pub use backend::StateBackend;
