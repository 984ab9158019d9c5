//! Shapes returned by the queries. Serializable so a front-end can render
//! or forward them as-is.

use bv_01_state_store::UserStats;
use serde::Serialize;
use shared_types::{BadgeId, SetId, UserId};

/// Default leaderboard length.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 5;

/// Cards owned in one set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryLine {
    pub set: SetId,
    pub cards: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based.
    pub rank: usize,
    pub user: UserId,
    pub total_cards: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeView {
    pub id: BadgeId,
    pub label: String,
}

impl From<&BadgeId> for BadgeView {
    fn from(id: &BadgeId) -> Self {
        Self {
            id: id.clone(),
            label: id.label().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub user: UserId,
    pub total_cards: u64,
    pub badges: Vec<BadgeId>,
    pub stats: UserStats,
}
