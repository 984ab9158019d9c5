//! # Typed State Records
//!
//! One record type per [`Category`]. Records are never deserialized blindly:
//! [`CategoryRecord::from_json`] walks the raw JSON, keeps every well-formed
//! entry and counts the ones it had to drop, so a single bad user entry never
//! takes its siblings down with it.
//!
//! ## Coercion rules
//!
//! | Category | Dropped |
//! |----------|---------|
//! | collections | unparseable card keys, counts that are not integers ≥ 1, empty sets |
//! | cooldowns | non-integer timestamps |
//! | watches | unparseable entries, non-finite or negative prices, duplicate keys |
//! | badges | non-string ids, duplicates |
//! | stats | entries that are not `{openers, trades}` objects |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::{BadgeId, CardKey, Price, SetId, Timestamp, UserId};
use tracing::debug;

use super::category::Category;

/// Outcome of decoding a category: the clean record plus how much was dropped.
#[derive(Debug)]
pub struct Validated<R> {
    pub record: R,
    pub dropped: usize,
}

/// The persisted document is not a JSON object at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected a JSON object at the top level, found {0}")]
pub struct ShapeError(pub &'static str);

/// A typed, validated view of one persisted category.
pub trait CategoryRecord: Serialize + Default + Send {
    const CATEGORY: Category;

    /// Decode raw JSON, dropping malformed entries.
    fn from_json(value: Value) -> Result<Validated<Self>, ShapeError>;
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn top_level(value: Value) -> Result<Map<String, Value>, ShapeError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ShapeError(json_kind(&other))),
    }
}

/// Decode every user entry of a category with `decode`, which may also count
/// partial drops inside an entry it keeps.
fn decode_per_user<V>(
    category: Category,
    value: Value,
    mut decode: impl FnMut(Value, &mut usize) -> Option<V>,
) -> Result<Validated<BTreeMap<UserId, V>>, ShapeError> {
    let map = top_level(value)?;
    let mut dropped = 0;
    let mut record = BTreeMap::new();

    for (user, raw) in map {
        match decode(raw, &mut dropped) {
            Some(entry) => {
                record.insert(UserId(user), entry);
            }
            None => {
                dropped += 1;
                debug!(category = %category, user = %user, "Dropping malformed user entry");
            }
        }
    }

    Ok(Validated { record, dropped })
}

// =============================================================================
// COLLECTIONS
// =============================================================================

/// Owned count per card of one set. Every present count is ≥ 1.
pub type SetCounts = BTreeMap<CardKey, u32>;

/// Everything one user owns, grouped by set.
pub type UserCollection = BTreeMap<SetId, SetCounts>;

/// `UserId → SetId → CardKey → count`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Collections(BTreeMap<UserId, UserCollection>);

impl Collections {
    pub fn user(&self, user: &UserId) -> Option<&UserCollection> {
        self.0.get(user)
    }

    pub fn count(&self, user: &UserId, set: &SetId, key: &CardKey) -> u32 {
        self.0
            .get(user)
            .and_then(|sets| sets.get(set))
            .and_then(|cards| cards.get(key))
            .copied()
            .unwrap_or(0)
    }

    /// Add one copy of `key` to the user's `set` bucket; returns the new count.
    pub fn increment(&mut self, user: &UserId, set: &SetId, key: &CardKey) -> u32 {
        let count = self
            .0
            .entry(user.clone())
            .or_default()
            .entry(set.clone())
            .or_default()
            .entry(key.clone())
            .or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    /// Total number of cards owned by `user` across all sets.
    pub fn total_cards(&self, user: &UserId) -> u64 {
        self.0.get(user).map(total_of).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &UserCollection)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Sum of every count in a user collection.
pub fn total_of(collection: &UserCollection) -> u64 {
    collection
        .values()
        .flat_map(|cards| cards.values())
        .map(|&n| u64::from(n))
        .sum()
}

fn decode_user_collection(raw: Value, dropped: &mut usize) -> Option<UserCollection> {
    let Value::Object(sets) = raw else {
        return None;
    };

    let mut collection = UserCollection::new();
    for (set, cards) in sets {
        let Value::Object(cards) = cards else {
            *dropped += 1;
            continue;
        };

        let mut counts = SetCounts::new();
        for (key, count) in cards {
            let count = count.as_u64().filter(|n| (1..=u64::from(u32::MAX)).contains(n));
            match (key.parse::<CardKey>(), count) {
                (Ok(key), Some(n)) => {
                    counts.insert(key, n as u32);
                }
                _ => *dropped += 1,
            }
        }

        if counts.is_empty() {
            *dropped += 1;
        } else {
            collection.insert(SetId(set), counts);
        }
    }
    Some(collection)
}

impl CategoryRecord for Collections {
    const CATEGORY: Category = Category::Collections;

    fn from_json(value: Value) -> Result<Validated<Self>, ShapeError> {
        let v = decode_per_user(Self::CATEGORY, value, decode_user_collection)?;
        Ok(Validated {
            record: Collections(v.record),
            dropped: v.dropped,
        })
    }
}

// =============================================================================
// COOLDOWNS
// =============================================================================

/// `UserId → timestamp of the last successful pack opening`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cooldowns(BTreeMap<UserId, Timestamp>);

impl Cooldowns {
    pub fn last_use(&self, user: &UserId) -> Option<Timestamp> {
        self.0.get(user).copied()
    }

    pub fn record(&mut self, user: &UserId, now: Timestamp) {
        self.0.insert(user.clone(), now);
    }
}

impl CategoryRecord for Cooldowns {
    const CATEGORY: Category = Category::Cooldowns;

    fn from_json(value: Value) -> Result<Validated<Self>, ShapeError> {
        let v = decode_per_user(Self::CATEGORY, value, |raw, _| raw.as_u64())?;
        Ok(Validated {
            record: Cooldowns(v.record),
            dropped: v.dropped,
        })
    }
}

// =============================================================================
// WATCHES
// =============================================================================

/// One watched card and the last price the user was told about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub key: CardKey,
    pub last_price: Price,
}

impl WatchEntry {
    pub fn new(key: CardKey, last_price: Price) -> Self {
        Self { key, last_price }
    }
}

/// `UserId → watch entries in insertion order`, unique by key.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Watches(BTreeMap<UserId, Vec<WatchEntry>>);

impl Watches {
    pub fn entries(&self, user: &UserId) -> &[WatchEntry] {
        self.0.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn get(&self, user: &UserId, key: &CardKey) -> Option<&WatchEntry> {
        self.entries(user).iter().find(|e| &e.key == key)
    }

    pub fn contains(&self, user: &UserId, key: &CardKey) -> bool {
        self.get(user, key).is_some()
    }

    /// Append `entry`; `false` if the user already watches that key.
    pub fn insert(&mut self, user: &UserId, entry: WatchEntry) -> bool {
        let list = self.0.entry(user.clone()).or_default();
        if list.iter().any(|e| e.key == entry.key) {
            return false;
        }
        list.push(entry);
        true
    }

    /// Remove the entry for `key`; `false` if it was not watched.
    pub fn remove(&mut self, user: &UserId, key: &CardKey) -> bool {
        let Some(list) = self.0.get_mut(user) else {
            return false;
        };
        let before = list.len();
        list.retain(|e| &e.key != key);
        let removed = list.len() != before;
        if list.is_empty() {
            self.0.remove(user);
        }
        removed
    }

    /// Overwrite the stored price of a watched entry; `false` if it is gone.
    pub fn set_price(&mut self, user: &UserId, key: &CardKey, price: Price) -> bool {
        match self
            .0
            .get_mut(user)
            .and_then(|list| list.iter_mut().find(|e| &e.key == key))
        {
            Some(entry) => {
                entry.last_price = price;
                true
            }
            None => false,
        }
    }

    /// Owned snapshot of every `(user, entry)` pair.
    pub fn snapshot(&self) -> Vec<(UserId, WatchEntry)> {
        self.0
            .iter()
            .flat_map(|(user, list)| list.iter().map(move |e| (user.clone(), e.clone())))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn decode_watch_list(raw: Value, dropped: &mut usize) -> Option<Vec<WatchEntry>> {
    let Value::Array(items) = raw else {
        return None;
    };

    let mut list: Vec<WatchEntry> = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<WatchEntry>(item) {
            Ok(entry)
                if entry.last_price.is_finite()
                    && entry.last_price >= 0.0
                    && !list.iter().any(|e| e.key == entry.key) =>
            {
                list.push(entry);
            }
            _ => *dropped += 1,
        }
    }
    Some(list)
}

impl CategoryRecord for Watches {
    const CATEGORY: Category = Category::Watches;

    fn from_json(value: Value) -> Result<Validated<Self>, ShapeError> {
        let mut v = decode_per_user(Self::CATEGORY, value, decode_watch_list)?;
        v.record.retain(|_, list| !list.is_empty());
        Ok(Validated {
            record: Watches(v.record),
            dropped: v.dropped,
        })
    }
}

// =============================================================================
// BADGES
// =============================================================================

/// `UserId → badges in the order they were granted`. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Badges(BTreeMap<UserId, Vec<BadgeId>>);

impl Badges {
    pub fn of(&self, user: &UserId) -> &[BadgeId] {
        self.0.get(user).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, user: &UserId, badge: &BadgeId) -> bool {
        self.of(user).contains(badge)
    }

    /// Grant `badge` unless already held; `true` if it was newly granted.
    pub fn grant(&mut self, user: &UserId, badge: BadgeId) -> bool {
        let held = self.0.entry(user.clone()).or_default();
        if held.contains(&badge) {
            return false;
        }
        held.push(badge);
        true
    }
}

fn decode_badge_list(raw: Value, dropped: &mut usize) -> Option<Vec<BadgeId>> {
    let Value::Array(items) = raw else {
        return None;
    };

    let mut list: Vec<BadgeId> = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::String(id) if !list.iter().any(|b| b.as_str() == id) => {
                list.push(BadgeId(id));
            }
            _ => *dropped += 1,
        }
    }
    Some(list)
}

impl CategoryRecord for Badges {
    const CATEGORY: Category = Category::Badges;

    fn from_json(value: Value) -> Result<Validated<Self>, ShapeError> {
        let v = decode_per_user(Self::CATEGORY, value, decode_badge_list)?;
        Ok(Validated {
            record: Badges(v.record),
            dropped: v.dropped,
        })
    }
}

// =============================================================================
// STATS
// =============================================================================

/// Usage counters of one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(default)]
    pub openers: u64,
    #[serde(default)]
    pub trades: u64,
}

/// `UserId → usage counters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Stats(BTreeMap<UserId, UserStats>);

impl Stats {
    /// Counters of `user`, zeroes when unknown.
    pub fn get(&self, user: &UserId) -> UserStats {
        self.0.get(user).copied().unwrap_or_default()
    }

    /// Count one successful pack opening; returns the new total.
    pub fn record_opening(&mut self, user: &UserId) -> u64 {
        let stats = self.0.entry(user.clone()).or_default();
        stats.openers += 1;
        stats.openers
    }
}

impl CategoryRecord for Stats {
    const CATEGORY: Category = Category::Stats;

    fn from_json(value: Value) -> Result<Validated<Self>, ShapeError> {
        let v = decode_per_user(Self::CATEGORY, value, |raw, _| {
            if !raw.is_object() {
                return None;
            }
            serde_json::from_value::<UserStats>(raw).ok()
        })?;
        Ok(Validated {
            record: Stats(v.record),
            dropped: v.dropped,
        })
    }
}
