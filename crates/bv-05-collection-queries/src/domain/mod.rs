pub mod views;

pub use views::{BadgeView, InventoryLine, LeaderboardEntry, Profile, DEFAULT_LEADERBOARD_SIZE};
