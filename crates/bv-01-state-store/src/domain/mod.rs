//! Domain layer: categories, typed records and their validation.

pub mod category;
pub mod errors;
pub mod records;

pub use category::Category;
pub use errors::StoreError;
pub use records::*;
