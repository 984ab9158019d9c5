//! Query service. Every call works on a fresh load and never writes,
//! except for the store's own self-healing of corrupt files.

use std::sync::Arc;

use bv_01_state_store::{
    total_of, Badges, Collections, StateStore, Stats, UserStats, WatchEntry, Watches,
};
use shared_types::UserId;
use tracing::debug;

use crate::domain::{BadgeView, InventoryLine, LeaderboardEntry, Profile};

pub struct CollectionQueries {
    store: Arc<StateStore>,
}

impl CollectionQueries {
    pub fn new(store: Arc<StateStore>) -> Self {
        Self { store }
    }

    /// Per-set totals of `user` by ascending set id, `None` if they own nothing.
    pub fn inventory(&self, user: &UserId) -> Option<Vec<InventoryLine>> {
        let collections: Collections = self.store.load();
        let lines: Vec<InventoryLine> = collections
            .user(user)?
            .iter()
            .map(|(set, cards)| InventoryLine {
                set: set.clone(),
                cards: cards.values().map(|&n| u64::from(n)).sum(),
            })
            .filter(|line| line.cards > 0)
            .collect();

        (!lines.is_empty()).then_some(lines)
    }

    /// Users ranked by total cards, most first. Ties go to the smaller id.
    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        let collections: Collections = self.store.load();
        let mut totals: Vec<(UserId, u64)> = collections
            .iter()
            .map(|(user, collection)| (user.clone(), total_of(collection)))
            .filter(|(_, total)| *total > 0)
            .collect();
        totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        debug!(users = totals.len(), limit = limit, "[bv-05] Leaderboard computed");
        totals
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (user, total_cards))| LeaderboardEntry {
                rank: i + 1,
                user,
                total_cards,
            })
            .collect()
    }

    pub fn stats(&self, user: &UserId) -> UserStats {
        self.store.load::<Stats>().get(user)
    }

    pub fn profile(&self, user: &UserId) -> Profile {
        Profile {
            user: user.clone(),
            total_cards: self.store.load::<Collections>().total_cards(user),
            badges: self.store.load::<Badges>().of(user).to_vec(),
            stats: self.stats(user),
        }
    }

    /// Badges in the order they were granted, with display labels.
    pub fn badges(&self, user: &UserId) -> Vec<BadgeView> {
        self.store
            .load::<Badges>()
            .of(user)
            .iter()
            .map(BadgeView::from)
            .collect()
    }

    pub fn watched(&self, user: &UserId) -> Vec<WatchEntry> {
        self.store.load::<Watches>().entries(user).to_vec()
    }
}
