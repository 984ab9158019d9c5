pub mod service;

pub use service::{PackOpening, PackOpeningConfig, PackOpeningService};
