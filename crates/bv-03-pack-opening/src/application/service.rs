//! # Pack Opening Service
//!
//! Orchestrates one opening: cooldown gate, catalog fetch, draw, then the
//! state mutations. Nothing is written unless the draw succeeded and the
//! cooldown could be consumed.

use std::sync::Arc;
use std::time::Duration;

use bv_01_state_store::{Badges, Collections, Cooldowns, StateStore, Stats};
use bv_02_catalog::CatalogProvider;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared_types::{BadgeId, Card, SetId, TimeSource, UserId};
use tracing::{debug, info};

use crate::domain::{
    apply_to_collection, draw_pack, CooldownDecision, CooldownPolicy, PackError, PackLayout,
    DEFAULT_COOLDOWN,
};

#[derive(Debug, Clone)]
pub struct PackOpeningConfig {
    /// Minimum time between two openings of the same user.
    pub cooldown: Duration,
    pub layout: PackLayout,
}

impl Default for PackOpeningConfig {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
            layout: PackLayout::default(),
        }
    }
}

/// Result of a successful opening.
#[derive(Debug, Clone, PartialEq)]
pub struct PackOpening {
    pub set_id: SetId,
    /// Commons, then uncommons, then the rare.
    pub cards: Vec<Card>,
    /// Badges granted by this opening.
    pub new_badges: Vec<BadgeId>,
    /// The user's opening count including this one.
    pub total_openers: u64,
}

impl PackOpening {
    /// The last card of the pack, shown as the reveal.
    pub fn reveal(&self) -> Option<&Card> {
        self.cards.last()
    }
}

pub struct PackOpeningService {
    store: Arc<StateStore>,
    catalog: Arc<dyn CatalogProvider>,
    clock: Arc<dyn TimeSource>,
    policy: CooldownPolicy,
    layout: PackLayout,
    rng: Mutex<StdRng>,
}

impl PackOpeningService {
    pub fn new(
        store: Arc<StateStore>,
        catalog: Arc<dyn CatalogProvider>,
        clock: Arc<dyn TimeSource>,
        config: PackOpeningConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            clock,
            policy: CooldownPolicy::new(config.cooldown),
            layout: config.layout,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the random source, e.g. with a seeded one.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn policy(&self) -> &CooldownPolicy {
        &self.policy
    }

    /// Time left before `user` may open again, `None` when allowed now.
    pub fn cooldown_remaining(&self, user: &UserId) -> Option<Duration> {
        let cooldowns: Cooldowns = self.store.load();
        match self.policy.check(cooldowns.last_use(user), self.clock.now()) {
            CooldownDecision::Allowed => None,
            CooldownDecision::Denied { remaining } => Some(remaining),
        }
    }

    /// Open one pack of `set` for `user`. The set id is upper-cased first.
    pub async fn open_pack(&self, user: &UserId, set: &str) -> Result<PackOpening, PackError> {
        let set_id = SetId::normalized(set);

        if let Some(remaining) = self.cooldown_remaining(user) {
            debug!(
                user = %user,
                remaining_ms = remaining.as_millis() as u64,
                "[bv-03] Cooldown active"
            );
            return Err(PackError::RateLimited { remaining });
        }

        let candidates = self.catalog.list_cards(&set_id).await?;
        let cards = {
            let mut rng = self.rng.lock();
            draw_pack(&candidates, &self.layout, &mut *rng)
        };
        if cards.is_empty() {
            return Err(PackError::SetNotFound(set_id));
        }

        // Re-check under the cooldown lock: a concurrent opening by the same
        // user may have won while the catalog was being queried.
        let now = self.clock.now();
        let decision = self.store.update(|cooldowns: &mut Cooldowns| {
            self.policy.check_and_consume(cooldowns, user, now)
        });
        if let CooldownDecision::Denied { remaining } = decision {
            return Err(PackError::RateLimited { remaining });
        }

        self.store.update(|collections: &mut Collections| {
            apply_to_collection(collections, user, &set_id, &cards)
        });
        let total_openers = self
            .store
            .update(|stats: &mut Stats| stats.record_opening(user));

        let first_pack = BadgeId::first_pack();
        let mut new_badges = Vec::new();
        if self
            .store
            .update(|badges: &mut Badges| badges.grant(user, first_pack.clone()))
        {
            new_badges.push(first_pack);
        }

        info!(
            user = %user,
            set = %set_id,
            cards = cards.len(),
            total_openers = total_openers,
            "[bv-03] Pack opened"
        );

        Ok(PackOpening {
            set_id,
            cards,
            new_badges,
            total_openers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bv_02_catalog::{CatalogError, InMemoryCatalog};
    use shared_types::{CardKey, CardPrices, ManualTimeSource};

    const START: u64 = 1_700_000_000_000;

    fn card(set: &str, number: usize, rarity: &str) -> Card {
        Card {
            key: CardKey::new(SetId::new(set), number.to_string()),
            name: format!("{} #{}", set, number),
            rarity: Some(rarity.to_string()),
            image_url: None,
            prices: CardPrices::default(),
        }
    }

    fn sv1_pool() -> Vec<Card> {
        let mut pool = Vec::new();
        for i in 0..12 {
            pool.push(card("sv1", i, "Common"));
        }
        for i in 12..18 {
            pool.push(card("sv1", i, "Uncommon"));
        }
        for i in 18..21 {
            pool.push(card("sv1", i, "Rare"));
        }
        pool
    }

    struct Fixture {
        store: Arc<StateStore>,
        catalog: Arc<InMemoryCatalog>,
        clock: Arc<ManualTimeSource>,
        service: PackOpeningService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(StateStore::in_memory());
        let catalog = Arc::new(InMemoryCatalog::with_cards(sv1_pool()));
        let clock = Arc::new(ManualTimeSource::new(START));
        let service = PackOpeningService::new(
            store.clone(),
            catalog.clone(),
            clock.clone(),
            PackOpeningConfig::default(),
        )
        .with_rng(StdRng::seed_from_u64(42));
        Fixture {
            store,
            catalog,
            clock,
            service,
        }
    }

    fn alice() -> UserId {
        UserId::new("alice")
    }

    #[tokio::test]
    async fn test_opening_records_everything() {
        let f = fixture();

        let opening = f.service.open_pack(&alice(), "sv1").await.unwrap();

        assert_eq!(opening.set_id, SetId::new("SV1"));
        assert_eq!(opening.cards.len(), 10);
        assert_eq!(opening.reveal().and_then(|c| c.rarity.as_deref()), Some("Rare"));
        assert_eq!(opening.new_badges, vec![BadgeId::first_pack()]);
        assert_eq!(opening.total_openers, 1);

        let collections: Collections = f.store.load();
        assert_eq!(collections.total_cards(&alice()), 10);
        for drawn in &opening.cards {
            assert!(collections.count(&alice(), &SetId::new("SV1"), &drawn.key) >= 1);
        }
        let cooldowns: Cooldowns = f.store.load();
        assert_eq!(cooldowns.last_use(&alice()), Some(START));
    }

    #[tokio::test]
    async fn test_second_opening_within_window_is_rate_limited() {
        let f = fixture();
        f.service.open_pack(&alice(), "sv1").await.unwrap();

        f.clock.advance(Duration::from_secs(10 * 60));
        let err = f.service.open_pack(&alice(), "sv1").await.unwrap_err();

        assert_eq!(
            err,
            PackError::RateLimited {
                remaining: Duration::from_secs(50 * 60)
            }
        );
        let collections: Collections = f.store.load();
        assert_eq!(collections.total_cards(&alice()), 10);
        assert_eq!(f.store.load::<Stats>().get(&alice()).openers, 1);
    }

    #[tokio::test]
    async fn test_badge_granted_only_once() {
        let f = fixture();
        f.service.open_pack(&alice(), "sv1").await.unwrap();

        f.clock.advance(Duration::from_secs(3600));
        let second = f.service.open_pack(&alice(), "SV1").await.unwrap();

        assert!(second.new_badges.is_empty());
        assert_eq!(second.total_openers, 2);
        assert_eq!(f.store.load::<Badges>().of(&alice()).len(), 1);
        assert_eq!(f.store.load::<Collections>().total_cards(&alice()), 20);
    }

    #[tokio::test]
    async fn test_unknown_set_mutates_nothing() {
        let f = fixture();

        let err = f.service.open_pack(&alice(), "nope").await.unwrap_err();

        assert_eq!(err, PackError::SetNotFound(SetId::new("NOPE")));
        assert_eq!(f.store.load::<Cooldowns>().last_use(&alice()), None);
        assert!(f.store.load::<Collections>().is_empty());
        assert!(f.service.cooldown_remaining(&alice()).is_none());
    }

    #[tokio::test]
    async fn test_provider_failure_mutates_nothing() {
        let f = fixture();
        f.catalog.set_offline(true);

        let err = f.service.open_pack(&alice(), "sv1").await.unwrap_err();

        assert_eq!(err, PackError::ProviderUnavailable(CatalogError::Offline));
        assert_eq!(f.store.load::<Cooldowns>().last_use(&alice()), None);
        assert_eq!(f.store.load::<Stats>().get(&alice()).openers, 0);
    }

    #[tokio::test]
    async fn test_users_have_independent_cooldowns() {
        let f = fixture();
        f.service.open_pack(&alice(), "sv1").await.unwrap();

        let bob = UserId::new("bob");
        assert!(f.service.open_pack(&bob, "sv1").await.is_ok());
        assert!(f.service.cooldown_remaining(&alice()).is_some());
    }

    /// Provider that lets a rival opening win while the catalog is queried.
    struct RacingCatalog {
        inner: InMemoryCatalog,
        store: Arc<StateStore>,
        user: UserId,
        at: u64,
    }

    #[async_trait::async_trait]
    impl CatalogProvider for RacingCatalog {
        async fn list_cards(&self, set: &SetId) -> Result<Vec<Card>, CatalogError> {
            let policy = CooldownPolicy::default();
            self.store
                .update(|c: &mut Cooldowns| policy.check_and_consume(c, &self.user, self.at));
            self.inner.list_cards(set).await
        }

        async fn find_card(
            &self,
            set: &SetId,
            number: &str,
            lang: Option<&str>,
        ) -> Result<Option<Card>, CatalogError> {
            self.inner.find_card(set, number, lang).await
        }

        async fn list_sets(&self) -> Result<Vec<shared_types::CardSet>, CatalogError> {
            self.inner.list_sets().await
        }
    }

    #[tokio::test]
    async fn test_losing_concurrent_opening_is_rate_limited() {
        let store = Arc::new(StateStore::in_memory());
        let catalog = Arc::new(RacingCatalog {
            inner: InMemoryCatalog::with_cards(sv1_pool()),
            store: store.clone(),
            user: alice(),
            at: START,
        });
        let clock = Arc::new(ManualTimeSource::new(START + 5_000));
        let service =
            PackOpeningService::new(store.clone(), catalog, clock, PackOpeningConfig::default());

        let err = service.open_pack(&alice(), "sv1").await.unwrap_err();

        assert_eq!(
            err,
            PackError::RateLimited {
                remaining: Duration::from_secs(3600 - 5)
            }
        );
        assert!(store.load::<Collections>().is_empty());
        assert_eq!(store.load::<Stats>().get(&alice()).openers, 0);
    }
}
