//! # Core Domain Entities
//!
//! Identifiers and catalog entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`, `SetId`, `BadgeId`
//! - **Catalog**: `CardKey`, `Card`, `CardPrices`, `CardSet`

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// A card price in euros as reported by the catalog.
pub type Price = f64;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Opaque, stable identifier for a user of the front-end.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a card set (one set = one kind of pack).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SetId(pub String);

impl SetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Trimmed, upper-cased form used when a user names a set.
    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an achievement badge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeId(pub String);

impl BadgeId {
    /// Granted on a user's first successful pack opening.
    pub const FIRST_PACK: &'static str = "first-pack";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn first_pack() -> Self {
        Self(Self::FIRST_PACK.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human readable label. Unknown badges are shown by id.
    pub fn label(&self) -> &str {
        match self.0.as_str() {
            Self::FIRST_PACK => "First Pack",
            other => other,
        }
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: CATALOG
// =============================================================================

/// Composite key of a card: its set and its number within the set.
///
/// Serialized as `"setId/cardNumber"`, which is also the form used as a map
/// key in the persisted collection.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct CardKey {
    pub set: SetId,
    pub number: String,
}

impl CardKey {
    pub fn new(set: SetId, number: impl Into<String>) -> Self {
        Self {
            set,
            number: number.into(),
        }
    }
}

impl fmt::Display for CardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.set, self.number)
    }
}

/// Error returned when a card key string is not `set/number`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid card key: {0:?} (expected \"set/number\")")]
pub struct ParseCardKeyError(pub String);

impl FromStr for CardKey {
    type Err = ParseCardKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((set, number)) if !set.is_empty() && !number.is_empty() => {
                Ok(CardKey::new(SetId::new(set), number))
            }
            _ => Err(ParseCardKeyError(s.to_string())),
        }
    }
}

/// Market prices reported for a card. Any of them may be unknown.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CardPrices {
    pub low: Option<Price>,
    pub average_sell: Option<Price>,
    pub trend: Option<Price>,
}

/// A card as described by the catalog provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub key: CardKey,
    pub name: String,
    /// Rarity label as printed by the catalog ("Common", "Rare Holo", ...).
    pub rarity: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub prices: CardPrices,
}

impl Card {
    /// The price tracked by watch lists: average sell price, `0` if unknown.
    pub fn market_price(&self) -> Price {
        self.prices.average_sell.unwrap_or(0.0)
    }
}

/// A card set (expansion) as listed by the catalog provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    pub id: SetId,
    pub name: String,
    pub series: Option<String>,
    pub release_date: Option<NaiveDate>,
}
