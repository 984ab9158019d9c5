//! Consecutive "card not found" answers per watch entry.
//!
//! Only a definite "not found" counts. A found card resets the counter and a
//! transport failure leaves it untouched, so an outage never prunes a list.

use std::collections::{HashMap, HashSet};

use shared_types::{CardKey, UserId};

/// Default number of consecutive misses before an entry is pruned.
pub const DEFAULT_PRUNE_AFTER_MISSES: u32 = 24;

#[derive(Debug, Default)]
pub struct MissTracker {
    /// `0` disables pruning.
    threshold: u32,
    counts: HashMap<(UserId, CardKey), u32>,
}

impl MissTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            counts: HashMap::new(),
        }
    }

    /// Count one miss; `true` once the entry should be pruned.
    pub fn record_miss(&mut self, user: &UserId, key: &CardKey) -> bool {
        let count = self
            .counts
            .entry((user.clone(), key.clone()))
            .or_insert(0);
        *count = count.saturating_add(1);
        self.threshold > 0 && *count >= self.threshold
    }

    pub fn record_hit(&mut self, user: &UserId, key: &CardKey) {
        self.counts.remove(&(user.clone(), key.clone()));
    }

    pub fn misses(&self, user: &UserId, key: &CardKey) -> u32 {
        self.counts
            .get(&(user.clone(), key.clone()))
            .copied()
            .unwrap_or(0)
    }

    /// Drop counters of entries that are no longer watched.
    pub fn retain_watched(&mut self, watched: &HashSet<(UserId, CardKey)>) {
        self.counts.retain(|entry, _| watched.contains(entry));
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
