//! # Watch Registry
//!
//! Per-user watch lists over the `Watches` category.
//!
//! The catalog is only asked for a price when a key is about to be added,
//! and always outside the category lock. The insert itself re-checks
//! presence under the lock, so concurrent toggles never duplicate a key.

use std::sync::Arc;

use bv_01_state_store::{StateStore, WatchEntry, Watches};
use bv_02_catalog::CatalogProvider;
use reqwest::Url;
use shared_types::{Card, CardKey, Price, SetId, UserId};
use tracing::{debug, warn};

use crate::domain::{WatchError, WatchToggle};

const CARDMARKET_SEARCH_URL: &str = "https://www.cardmarket.com/fr/Pokemon/Products/Singles";

/// Current prices of a card as shown to a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Key under which the card would be watched.
    pub key: CardKey,
    pub card: Card,
    pub watching: bool,
}

impl Quote {
    /// Cardmarket search page for this card's name.
    pub fn cardmarket_url(&self) -> Option<Url> {
        Url::parse_with_params(CARDMARKET_SEARCH_URL, &[("searchString", &self.card.name)]).ok()
    }
}

pub struct WatchRegistry {
    store: Arc<StateStore>,
    catalog: Arc<dyn CatalogProvider>,
    language: Option<String>,
}

impl WatchRegistry {
    pub fn new(
        store: Arc<StateStore>,
        catalog: Arc<dyn CatalogProvider>,
        language: Option<String>,
    ) -> Self {
        Self {
            store,
            catalog,
            language,
        }
    }

    /// Flip the watch state of `key` for `user`. Never fails: an unknown or
    /// unreachable card is watched at price `0`.
    pub async fn toggle(&self, user: &UserId, key: &CardKey) -> WatchToggle {
        if self
            .store
            .update(|watches: &mut Watches| watches.remove(user, key))
        {
            debug!(user = %user, key = %key, "[bv-04] Unwatched");
            return WatchToggle::NowUnwatching;
        }

        self.insert(user, key).await;
        WatchToggle::NowWatching
    }

    /// Start watching `key`. `false` if it was already watched.
    pub async fn watch(&self, user: &UserId, key: &CardKey) -> bool {
        if self.is_watching(user, key) {
            return false;
        }
        self.insert(user, key).await
    }

    /// Stop watching `key`. `false` if it was not watched.
    pub fn unwatch(&self, user: &UserId, key: &CardKey) -> bool {
        self.store
            .update(|watches: &mut Watches| watches.remove(user, key))
    }

    pub fn is_watching(&self, user: &UserId, key: &CardKey) -> bool {
        self.store.load::<Watches>().contains(user, key)
    }

    /// The user's entries in the order they were added.
    pub fn list(&self, user: &UserId) -> Vec<WatchEntry> {
        self.store.load::<Watches>().entries(user).to_vec()
    }

    /// Look a card up with its prices and the user's watch state.
    pub async fn quote(&self, user: &UserId, set: &str, number: &str) -> Result<Quote, WatchError> {
        let key = CardKey::new(SetId::normalized(set), number.trim());
        let card = self
            .catalog
            .find_by_key(&key, self.language.as_deref())
            .await?
            .ok_or_else(|| WatchError::CardNotFound(key.clone()))?;

        let watching = self.is_watching(user, &key);
        Ok(Quote {
            key,
            card,
            watching,
        })
    }

    async fn insert(&self, user: &UserId, key: &CardKey) -> bool {
        let price = self.current_price(key).await;
        let inserted = self.store.update(|watches: &mut Watches| {
            watches.insert(user, WatchEntry::new(key.clone(), price))
        });
        if inserted {
            debug!(user = %user, key = %key, price = price, "[bv-04] Watching");
        }
        inserted
    }

    async fn current_price(&self, key: &CardKey) -> Price {
        match self.catalog.find_by_key(key, self.language.as_deref()).await {
            Ok(Some(card)) => card.market_price(),
            Ok(None) => 0.0,
            Err(e) => {
                warn!(key = %key, error = %e, "[bv-04] Price lookup failed, watching at 0");
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bv_02_catalog::{CatalogError, InMemoryCatalog};
    use shared_types::CardPrices;

    fn card(key: &str, price: Option<f64>) -> Card {
        Card {
            key: key.parse().unwrap(),
            name: "Pikachu ex".into(),
            rarity: Some("Double Rare".into()),
            image_url: None,
            prices: CardPrices {
                average_sell: price,
                ..Default::default()
            },
        }
    }

    fn registry() -> (Arc<StateStore>, Arc<InMemoryCatalog>, WatchRegistry) {
        let store = Arc::new(StateStore::in_memory());
        let catalog = Arc::new(InMemoryCatalog::with_cards([card("sv1/25", Some(4.5))]));
        let registry = WatchRegistry::new(store.clone(), catalog.clone(), Some("fr".into()));
        (store, catalog, registry)
    }

    fn user() -> UserId {
        UserId::new("u1")
    }

    fn key() -> CardKey {
        "SV1/25".parse().unwrap()
    }

    #[tokio::test]
    async fn test_toggle_is_an_involution() {
        let (store, _catalog, registry) = registry();

        assert_eq!(registry.toggle(&user(), &key()).await, WatchToggle::NowWatching);
        let entry = store.load::<Watches>().get(&user(), &key()).cloned().unwrap();
        assert_eq!(entry.last_price, 4.5);

        assert_eq!(registry.toggle(&user(), &key()).await, WatchToggle::NowUnwatching);
        assert!(store.load::<Watches>().is_empty());

        assert_eq!(registry.toggle(&user(), &key()).await, WatchToggle::NowWatching);
    }

    #[tokio::test]
    async fn test_unreachable_provider_watches_at_zero() {
        let (store, catalog, registry) = registry();
        catalog.set_offline(true);

        let state = registry.toggle(&user(), &key()).await;

        assert!(state.is_watching());
        assert_eq!(store.load::<Watches>().get(&user(), &key()).unwrap().last_price, 0.0);
    }

    #[tokio::test]
    async fn test_unwatch_does_not_query_provider() {
        let (_store, catalog, registry) = registry();
        registry.toggle(&user(), &key()).await;
        let calls = catalog.calls();

        registry.toggle(&user(), &key()).await;

        assert_eq!(catalog.calls(), calls);
    }

    #[tokio::test]
    async fn test_explicit_watch_and_unwatch_are_idempotent() {
        let (_store, _catalog, registry) = registry();

        assert!(registry.watch(&user(), &key()).await);
        assert!(!registry.watch(&user(), &key()).await);
        assert_eq!(registry.list(&user()).len(), 1);

        assert!(registry.unwatch(&user(), &key()));
        assert!(!registry.unwatch(&user(), &key()));
        assert!(registry.list(&user()).is_empty());
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let (_store, catalog, registry) = registry();
        catalog.add_cards([card("sv1/1", Some(1.0))]);

        registry.toggle(&user(), &key()).await;
        registry.toggle(&user(), &"SV1/1".parse().unwrap()).await;

        let keys: Vec<_> = registry.list(&user()).iter().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["SV1/25", "SV1/1"]);
    }

    #[tokio::test]
    async fn test_quote_reports_watch_state() {
        let (_store, _catalog, registry) = registry();

        let quote = registry.quote(&user(), "sv1", "25").await.unwrap();
        assert_eq!(quote.key, key());
        assert!(!quote.watching);
        assert_eq!(quote.card.prices.average_sell, Some(4.5));
        let url = quote.cardmarket_url().unwrap();
        assert!(url.as_str().starts_with(CARDMARKET_SEARCH_URL));
        assert!(url.query().unwrap_or_default().contains("searchString=Pikachu"));

        registry.toggle(&user(), &quote.key).await;
        assert!(registry.quote(&user(), "sv1", "25").await.unwrap().watching);
    }

    #[tokio::test]
    async fn test_quote_errors() {
        let (_store, catalog, registry) = registry();

        let missing = registry.quote(&user(), "sv1", "999").await.unwrap_err();
        assert_eq!(missing, WatchError::CardNotFound("SV1/999".parse().unwrap()));

        catalog.set_offline(true);
        let down = registry.quote(&user(), "sv1", "25").await.unwrap_err();
        assert_eq!(down, WatchError::ProviderUnavailable(CatalogError::Offline));
    }
}
