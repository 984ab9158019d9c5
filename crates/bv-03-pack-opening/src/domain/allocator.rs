//! # Pack Allocator
//!
//! Rarity-stratified draw without replacement, and the collection mutation
//! that follows a successful opening.
//!
//! ```text
//! candidates ──classify──► Common │ Uncommon │ Rare-or-better
//!                              │        │            │
//!                          sample 6  sample 3    sample 1
//!                              └────────┴─────┬──────┘
//!                                   commons, uncommons, rare
//! ```

use bv_01_state_store::Collections;
use rand::seq::SliceRandom;
use rand::Rng;
use shared_types::{Card, SetId, UserId};

/// Rarity tier a card is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackTier {
    Common,
    Uncommon,
    RareOrBetter,
}

impl PackTier {
    /// Tier of a rarity label. Cards with no tier (promos, energies without
    /// rarity...) are never drawn.
    pub fn classify(rarity: Option<&str>) -> Option<Self> {
        match rarity? {
            "Common" => Some(PackTier::Common),
            "Uncommon" => Some(PackTier::Uncommon),
            r if r.contains("Rare") => Some(PackTier::RareOrBetter),
            _ => None,
        }
    }
}

/// Number of cards drawn from each tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackLayout {
    pub commons: usize,
    pub uncommons: usize,
    pub rares: usize,
}

impl Default for PackLayout {
    fn default() -> Self {
        Self {
            commons: 6,
            uncommons: 3,
            rares: 1,
        }
    }
}

impl PackLayout {
    pub fn size(&self) -> usize {
        self.commons + self.uncommons + self.rares
    }
}

/// Draw one pack from `candidates`.
///
/// Tiers are sampled independently and uniformly. A tier with fewer cards
/// than requested contributes all it has, so packs may come out short.
pub fn draw_pack<R: Rng + ?Sized>(
    candidates: &[Card],
    layout: &PackLayout,
    rng: &mut R,
) -> Vec<Card> {
    let mut commons = Vec::new();
    let mut uncommons = Vec::new();
    let mut rares = Vec::new();
    for card in candidates {
        match PackTier::classify(card.rarity.as_deref()) {
            Some(PackTier::Common) => commons.push(card),
            Some(PackTier::Uncommon) => uncommons.push(card),
            Some(PackTier::RareOrBetter) => rares.push(card),
            None => {}
        }
    }

    let mut pack = Vec::with_capacity(layout.size());
    for (tier, wanted) in [
        (&commons, layout.commons),
        (&uncommons, layout.uncommons),
        (&rares, layout.rares),
    ] {
        pack.extend(tier.choose_multiple(rng, wanted).map(|card| (*card).clone()));
    }
    pack
}

/// Add one copy of every drawn card to `user`'s bucket for `set`.
pub fn apply_to_collection(
    collections: &mut Collections,
    user: &UserId,
    set: &SetId,
    drawn: &[Card],
) {
    for card in drawn {
        collections.increment(user, set, &card.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use shared_types::{CardKey, CardPrices};
    use std::collections::HashSet;

    fn card(number: usize, rarity: Option<&str>) -> Card {
        Card {
            key: CardKey::new(SetId::new("sv1"), number.to_string()),
            name: format!("Card {}", number),
            rarity: rarity.map(str::to_string),
            image_url: None,
            prices: CardPrices::default(),
        }
    }

    fn full_pool() -> Vec<Card> {
        let mut pool = Vec::new();
        for i in 0..20 {
            pool.push(card(i, Some("Common")));
        }
        for i in 20..30 {
            pool.push(card(i, Some("Uncommon")));
        }
        pool.push(card(30, Some("Rare Holo")));
        pool.push(card(31, Some("Double Rare")));
        pool.push(card(32, None));
        pool.push(card(33, Some("Promo")));
        pool
    }

    #[test]
    fn test_classify() {
        assert_eq!(PackTier::classify(Some("Common")), Some(PackTier::Common));
        assert_eq!(PackTier::classify(Some("Uncommon")), Some(PackTier::Uncommon));
        assert_eq!(PackTier::classify(Some("Rare")), Some(PackTier::RareOrBetter));
        assert_eq!(
            PackTier::classify(Some("Illustration Rare")),
            Some(PackTier::RareOrBetter)
        );
        assert_eq!(PackTier::classify(Some("common")), None);
        assert_eq!(PackTier::classify(Some("Promo")), None);
        assert_eq!(PackTier::classify(None), None);
    }

    #[test]
    fn test_full_pack_layout_and_order() {
        let mut rng = StdRng::seed_from_u64(7);
        let pack = draw_pack(&full_pool(), &PackLayout::default(), &mut rng);

        assert_eq!(pack.len(), 10);
        let tiers: Vec<_> = pack
            .iter()
            .map(|c| PackTier::classify(c.rarity.as_deref()))
            .collect();
        assert!(tiers[..6].iter().all(|t| *t == Some(PackTier::Common)));
        assert!(tiers[6..9].iter().all(|t| *t == Some(PackTier::Uncommon)));
        assert_eq!(tiers[9], Some(PackTier::RareOrBetter));

        let distinct: HashSet<_> = pack.iter().map(|c| c.key.clone()).collect();
        assert_eq!(distinct.len(), 10);
    }

    #[test]
    fn test_short_tiers_yield_short_pack() {
        let pool = vec![card(1, Some("Common")), card(2, Some("Common")), card(3, Some("Rare"))];
        let mut rng = StdRng::seed_from_u64(1);

        let pack = draw_pack(&pool, &PackLayout::default(), &mut rng);

        assert_eq!(pack.len(), 3);
        assert_eq!(pack[2].key.number, "3");
    }

    #[test]
    fn test_apply_to_collection_counts_duplicates() {
        let mut collections = Collections::default();
        let user = UserId::new("u1");
        let set = SetId::new("SV1");
        let drawn = vec![card(1, Some("Common")), card(1, Some("Common")), card(2, Some("Rare"))];

        apply_to_collection(&mut collections, &user, &set, &drawn);

        assert_eq!(collections.count(&user, &set, &drawn[0].key), 2);
        assert_eq!(collections.count(&user, &set, &drawn[2].key), 1);
        assert_eq!(collections.total_cards(&user), 3);
    }

    fn rarity_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(Some("Common".to_string())),
            Just(Some("Uncommon".to_string())),
            Just(Some("Rare Holo".to_string())),
            Just(Some("Promo".to_string())),
            Just(None),
        ]
    }

    proptest! {
        #[test]
        fn prop_pack_is_bounded_and_drawn_from_pool(
            rarities in proptest::collection::vec(rarity_strategy(), 0..60),
            seed in any::<u64>(),
        ) {
            let pool: Vec<Card> = rarities
                .iter()
                .enumerate()
                .map(|(i, r)| card(i, r.as_deref()))
                .collect();
            let mut rng = StdRng::seed_from_u64(seed);

            let pack = draw_pack(&pool, &PackLayout::default(), &mut rng);

            prop_assert!(pack.len() <= 10);
            let keys: HashSet<_> = pack.iter().map(|c| c.key.clone()).collect();
            prop_assert_eq!(keys.len(), pack.len());
            for drawn in &pack {
                prop_assert!(pool.contains(drawn));
                prop_assert!(PackTier::classify(drawn.rarity.as_deref()).is_some());
            }
        }

        #[test]
        fn prop_collection_totals_sum_openings(
            pack_sizes in proptest::collection::vec(0usize..=10, 1..8),
        ) {
            let mut collections = Collections::default();
            let user = UserId::new("u1");
            let set = SetId::new("SV1");
            let mut expected = 0u64;

            for size in pack_sizes {
                let drawn: Vec<Card> = (0..size).map(|i| card(i, Some("Common"))).collect();
                apply_to_collection(&mut collections, &user, &set, &drawn);
                expected += size as u64;
            }

            prop_assert_eq!(collections.total_cards(&user), expected);
        }
    }
}
