pub mod allocator;
pub mod cooldown;
pub mod errors;

pub use allocator::{apply_to_collection, draw_pack, PackLayout, PackTier};
pub use cooldown::{format_remaining, CooldownDecision, CooldownPolicy, DEFAULT_COOLDOWN};
pub use errors::PackError;
