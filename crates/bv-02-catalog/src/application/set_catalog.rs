//! # Set Catalog
//!
//! Owned, refreshable read-through cache of the provider's set list.
//!
//! The snapshot is replaced wholesale on each successful `refresh()` and
//! stamped with `as_of`. A failed refresh keeps serving the previous snapshot.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use shared_types::{CardSet, SetId, TimeSource, Timestamp};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::CatalogError;
use crate::ports::CatalogProvider;

/// Maximum number of entries returned by listing helpers.
pub const LISTING_LIMIT: usize = 25;

#[derive(Default)]
struct Snapshot {
    sets: Vec<CardSet>,
    as_of: Option<Timestamp>,
}

/// A page of sets plus how many matches did not fit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetListing {
    pub sets: Vec<CardSet>,
    pub remaining: usize,
}

pub struct SetCatalog {
    provider: Arc<dyn CatalogProvider>,
    clock: Arc<dyn TimeSource>,
    snapshot: RwLock<Snapshot>,
}

impl SetCatalog {
    /// Create an empty cache. Nothing is fetched until [`SetCatalog::refresh`].
    pub fn new(provider: Arc<dyn CatalogProvider>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            provider,
            clock,
            snapshot: RwLock::new(Snapshot::default()),
        }
    }

    /// Re-fetch the set list, newest release first. Returns the set count.
    pub async fn refresh(&self) -> Result<usize, CatalogError> {
        let mut sets = match self.provider.list_sets().await {
            Ok(sets) => sets,
            Err(e) => {
                warn!(error = %e, "[bv-02] Set refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };
        sets.sort_by(|a, b| b.release_date.cmp(&a.release_date));

        let count = sets.len();
        let now = self.clock.now();
        *self.snapshot.write() = Snapshot {
            sets,
            as_of: Some(now),
        };

        info!(sets = count, as_of = now, "[bv-02] Set catalog refreshed");
        Ok(count)
    }

    /// When the snapshot was taken; `None` before the first successful refresh.
    pub fn as_of(&self) -> Option<Timestamp> {
        self.snapshot.read().as_of
    }

    pub fn sets(&self) -> Vec<CardSet> {
        self.snapshot.read().sets.clone()
    }

    pub fn len(&self) -> usize {
        self.snapshot.read().sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: &SetId) -> Option<CardSet> {
        self.snapshot
            .read()
            .sets
            .iter()
            .find(|s| s.id.as_str().eq_ignore_ascii_case(id.as_str()))
            .cloned()
    }

    /// Sets whose id or name contains `query` (case-insensitive), at most 25.
    pub fn autocomplete(&self, query: &str) -> Vec<CardSet> {
        let needle = query.to_lowercase();
        self.snapshot
            .read()
            .sets
            .iter()
            .filter(|s| {
                s.id.as_str().to_lowercase().contains(&needle)
                    || s.name.to_lowercase().contains(&needle)
            })
            .take(LISTING_LIMIT)
            .cloned()
            .collect()
    }

    /// Sets matching `query` on id, name or series; all sets when `None`.
    pub fn filter(&self, query: Option<&str>) -> SetListing {
        let needle = query.map(str::to_lowercase);
        let snapshot = self.snapshot.read();
        let matches: Vec<&CardSet> = snapshot
            .sets
            .iter()
            .filter(|s| match &needle {
                None => true,
                Some(n) => {
                    s.id.as_str().to_lowercase().contains(n)
                        || s.name.to_lowercase().contains(n)
                        || s
                            .series
                            .as_deref()
                            .is_some_and(|series| series.to_lowercase().contains(n))
                }
            })
            .collect();

        let remaining = matches.len().saturating_sub(LISTING_LIMIT);
        SetListing {
            sets: matches.into_iter().take(LISTING_LIMIT).cloned().collect(),
            remaining,
        }
    }
}

/// Background task refreshing `catalog` every `interval` until `shutdown`
/// flips to `true`. The first refresh runs immediately.
pub async fn refresh_task(
    catalog: Arc<SetCatalog>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // Failures are logged inside refresh(); the old snapshot stays.
                let _ = catalog.refresh().await;
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("[bv-02] Set refresh task stopped");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCatalog;
    use chrono::NaiveDate;
    use shared_types::ManualTimeSource;

    fn set(id: &str, name: &str, series: &str, date: Option<(i32, u32, u32)>) -> CardSet {
        CardSet {
            id: SetId::new(id),
            name: name.to_string(),
            series: Some(series.to_string()),
            release_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        }
    }

    fn catalog_with(sets: Vec<CardSet>) -> (Arc<InMemoryCatalog>, SetCatalog) {
        let provider = Arc::new(InMemoryCatalog::new());
        for s in sets {
            provider.add_set(s);
        }
        let clock = Arc::new(ManualTimeSource::new(42));
        let catalog = SetCatalog::new(provider.clone(), clock);
        (provider, catalog)
    }

    #[tokio::test]
    async fn test_refresh_sorts_newest_first_and_stamps() {
        let (_p, catalog) = catalog_with(vec![
            set("base1", "Base", "Base", Some((1999, 1, 9))),
            set("sv1", "Scarlet & Violet", "Scarlet & Violet", Some((2023, 3, 31))),
            set("odd", "Undated", "Misc", None),
        ]);
        assert_eq!(catalog.as_of(), None);

        assert_eq!(catalog.refresh().await.unwrap(), 3);

        let ids: Vec<_> = catalog.sets().iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["sv1", "base1", "odd"]);
        assert_eq!(catalog.as_of(), Some(42));
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let (provider, catalog) = catalog_with(vec![set("sv1", "SV", "SV", None)]);
        catalog.refresh().await.unwrap();

        provider.set_offline(true);
        assert!(catalog.refresh().await.is_err());

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.as_of(), Some(42));
    }

    #[tokio::test]
    async fn test_autocomplete_matches_id_or_name() {
        let (_p, catalog) = catalog_with(vec![
            set("sv1", "Scarlet & Violet", "Scarlet & Violet", None),
            set("swsh1", "Sword & Shield", "Sword & Shield", None),
        ]);
        catalog.refresh().await.unwrap();

        assert_eq!(catalog.autocomplete("SV").len(), 1);
        assert_eq!(catalog.autocomplete("sword").len(), 1);
        assert_eq!(catalog.autocomplete("s").len(), 2);
        assert!(catalog.get(&SetId::new("SWSH1")).is_some());
    }

    #[tokio::test]
    async fn test_filter_limits_and_counts_remaining() {
        let sets = (0..30)
            .map(|i| set(&format!("sv{}", i), "Scarlet", "Scarlet & Violet", None))
            .chain(std::iter::once(set("base1", "Base", "Original", None)))
            .collect();
        let (_p, catalog) = catalog_with(sets);
        catalog.refresh().await.unwrap();

        let listing = catalog.filter(Some("scarlet"));
        assert_eq!(listing.sets.len(), 25);
        assert_eq!(listing.remaining, 5);

        let by_series = catalog.filter(Some("original"));
        assert_eq!(by_series.sets.len(), 1);
        assert_eq!(by_series.remaining, 0);

        assert_eq!(catalog.filter(None).remaining, 6);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_task_runs_until_shutdown() {
        let (provider, catalog) = catalog_with(vec![set("sv1", "SV", "SV", None)]);
        let catalog = Arc::new(catalog);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(refresh_task(
            Arc::clone(&catalog),
            Duration::from_secs(60),
            rx,
        ));
        tokio::time::sleep(Duration::from_secs(130)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        // Immediate tick plus two more.
        assert_eq!(provider.calls(), 3);
        assert_eq!(catalog.len(), 1);
    }
}
