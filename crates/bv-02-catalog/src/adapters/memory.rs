use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{Card, CardKey, CardSet, Price, SetId};

use crate::domain::CatalogError;
use crate::ports::CatalogProvider;

#[derive(Default)]
struct CatalogData {
    cards: Vec<Card>,
    sets: Vec<CardSet>,
    failing: HashSet<CardKey>,
    offline: bool,
    delay: Option<Duration>,
}

/// In-memory catalog for tests and offline runs.
///
/// Set ids match case-insensitively, like the public API does. Individual
/// cards or the whole provider can be switched to failing.
#[derive(Default)]
pub struct InMemoryCatalog {
    data: RwLock<CatalogData>,
    calls: AtomicU64,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cards(cards: impl IntoIterator<Item = Card>) -> Self {
        let catalog = Self::new();
        catalog.add_cards(cards);
        catalog
    }

    pub fn add_cards(&self, cards: impl IntoIterator<Item = Card>) {
        self.data.write().cards.extend(cards);
    }

    pub fn add_set(&self, set: CardSet) {
        self.data.write().sets.push(set);
    }

    pub fn remove_card(&self, key: &CardKey) {
        self.data.write().cards.retain(|c| &c.key != key);
    }

    /// Set the average sell price of a known card.
    pub fn set_price(&self, key: &CardKey, price: Option<Price>) {
        let mut data = self.data.write();
        for card in data.cards.iter_mut().filter(|c| &c.key == key) {
            card.prices.average_sell = price;
        }
    }

    /// Make lookups of one card fail with a transport error.
    pub fn set_failing(&self, key: &CardKey, failing: bool) {
        let mut data = self.data.write();
        if failing {
            data.failing.insert(key.clone());
        } else {
            data.failing.remove(key);
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.data.write().offline = offline;
    }

    /// Delay every answer, to exercise timeouts.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.data.write().delay = delay;
    }

    /// Number of provider calls served so far.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin_call(&self) -> Result<(), CatalogError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (offline, delay) = {
            let data = self.data.read();
            (data.offline, data.delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if offline {
            return Err(CatalogError::Offline);
        }
        Ok(())
    }
}

fn same_set(a: &SetId, b: &SetId) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

#[async_trait]
impl CatalogProvider for InMemoryCatalog {
    async fn list_cards(&self, set: &SetId) -> Result<Vec<Card>, CatalogError> {
        self.begin_call().await?;
        let data = self.data.read();
        Ok(data
            .cards
            .iter()
            .filter(|c| same_set(&c.key.set, set))
            .cloned()
            .collect())
    }

    async fn find_card(
        &self,
        set: &SetId,
        number: &str,
        _preferred_language: Option<&str>,
    ) -> Result<Option<Card>, CatalogError> {
        self.begin_call().await?;
        let data = self.data.read();
        let found = data
            .cards
            .iter()
            .find(|c| same_set(&c.key.set, set) && c.key.number == number);

        match found {
            Some(card) if data.failing.contains(&card.key) => {
                Err(CatalogError::Http(format!("simulated failure for {}", card.key)))
            }
            Some(card) => Ok(Some(card.clone())),
            None => Ok(None),
        }
    }

    async fn list_sets(&self) -> Result<Vec<CardSet>, CatalogError> {
        self.begin_call().await?;
        Ok(self.data.read().sets.clone())
    }
}
