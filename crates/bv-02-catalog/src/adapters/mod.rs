//! Adapters layer: concrete catalog providers.

pub mod memory;
pub mod pokemon_tcg;
pub mod timeout;

pub use memory::InMemoryCatalog;
pub use pokemon_tcg::{PokemonTcgClient, PokemonTcgConfig, DEFAULT_BASE_URL};
pub use timeout::TimeoutCatalog;
