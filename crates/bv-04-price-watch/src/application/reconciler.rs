//! # Price Reconciler
//!
//! One pass over every watched card: fetch the current price, compare with
//! the stored one, notify and persist on change.
//!
//! ## Per-entry outcome
//!
//! | Provider answer | Effect |
//! |-----------------|--------|
//! | card, same price | nothing |
//! | card, new price | notify, then store the new price |
//! | card, new price, notify fails | nothing stored, retried next tick |
//! | not found | miss counted, entry pruned at the threshold |
//! | error / timeout | skipped, stored price untouched |
//!
//! One entry's failure never aborts the pass. Passes never overlap: a manual
//! check issued during a scheduled pass waits for it and then sees the
//! prices it stored.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use bv_01_state_store::{StateStore, WatchEntry, Watches};
use bv_02_catalog::CatalogProvider;
use parking_lot::Mutex;
use shared_types::{TimeSource, Timestamp, UserId};
use tracing::{debug, info, warn};

use crate::domain::{MissTracker, NotifyError, PriceChangeNotice, DEFAULT_PRUNE_AFTER_MISSES};
use crate::ports::NotificationSink;

#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// Bound on each notification call.
    pub notify_timeout: Duration,
    /// Consecutive "not found" answers before an entry is dropped; `0` never.
    pub prune_after_misses: u32,
    pub preferred_language: Option<String>,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            notify_timeout: Duration::from_secs(5),
            prune_after_misses: DEFAULT_PRUNE_AFTER_MISSES,
            preferred_language: None,
        }
    }
}

/// Counters of one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub checked: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub pruned: usize,
    pub notify_failures: usize,
}

pub struct PriceReconciler {
    store: Arc<StateStore>,
    catalog: Arc<dyn CatalogProvider>,
    sink: Arc<dyn NotificationSink>,
    clock: Arc<dyn TimeSource>,
    config: ReconcilerConfig,
    misses: Mutex<MissTracker>,
    last_tick: Mutex<Option<(Timestamp, TickReport)>>,
    pass: tokio::sync::Mutex<()>,
}

impl PriceReconciler {
    pub fn new(
        store: Arc<StateStore>,
        catalog: Arc<dyn CatalogProvider>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn TimeSource>,
        config: ReconcilerConfig,
    ) -> Self {
        let misses = Mutex::new(MissTracker::new(config.prune_after_misses));
        Self {
            store,
            catalog,
            sink,
            clock,
            config,
            misses,
            last_tick: Mutex::new(None),
            pass: tokio::sync::Mutex::new(()),
        }
    }

    /// When the last pass started and what it did.
    pub fn last_tick(&self) -> Option<(Timestamp, TickReport)> {
        *self.last_tick.lock()
    }

    /// Run one pass over a fresh read of every watch list.
    pub async fn tick(&self) -> TickReport {
        let _pass = self.pass.lock().await;
        let started_at = self.clock.now();
        let snapshot = self.store.load::<Watches>().snapshot();

        let live: HashSet<_> = snapshot
            .iter()
            .map(|(user, entry)| (user.clone(), entry.key.clone()))
            .collect();
        self.misses.lock().retain_watched(&live);

        let mut report = TickReport::default();
        for (user, entry) in snapshot {
            report.checked += 1;
            self.reconcile_entry(&user, &entry, &mut report).await;
        }

        if report.changed > 0 || report.pruned > 0 || report.skipped > 0 {
            info!(
                checked = report.checked,
                changed = report.changed,
                skipped = report.skipped,
                pruned = report.pruned,
                notify_failures = report.notify_failures,
                "[bv-04] Price reconciliation finished"
            );
        } else {
            debug!(checked = report.checked, "[bv-04] Prices unchanged");
        }

        *self.last_tick.lock() = Some((started_at, report));
        report
    }

    async fn reconcile_entry(&self, user: &UserId, entry: &WatchEntry, report: &mut TickReport) {
        let key = &entry.key;
        let lookup = self
            .catalog
            .find_by_key(key, self.config.preferred_language.as_deref())
            .await;

        let card = match lookup {
            Ok(Some(card)) => {
                self.misses.lock().record_hit(user, key);
                card
            }
            Ok(None) => {
                let prune = self.misses.lock().record_miss(user, key);
                if prune {
                    self.store
                        .update(|watches: &mut Watches| watches.remove(user, key));
                    warn!(
                        user = %user,
                        key = %key,
                        "[bv-04] Card keeps missing upstream, watch pruned"
                    );
                    report.pruned += 1;
                } else {
                    debug!(user = %user, key = %key, "[bv-04] Card not found upstream");
                    report.skipped += 1;
                }
                return;
            }
            Err(e) => {
                warn!(
                    user = %user,
                    key = %key,
                    error = %e,
                    "[bv-04] Price lookup failed, skipping"
                );
                report.skipped += 1;
                return;
            }
        };

        let new_price = card.market_price();
        if new_price == entry.last_price {
            report.unchanged += 1;
            return;
        }

        let notice = PriceChangeNotice {
            key: key.clone(),
            old_price: entry.last_price,
            new_price,
        };
        if let Err(e) = self.notify(user, &notice).await {
            warn!(user = %user, key = %key, error = %e, "[bv-04] Notification failed");
            report.notify_failures += 1;
            return;
        }

        // Only replace the price this pass compared against. An entry that was
        // unwatched, or re-watched at another price, keeps what it has now.
        let stored = self.store.update(|watches: &mut Watches| {
            let current = watches.get(user, key).map(|e| e.last_price);
            current == Some(entry.last_price) && watches.set_price(user, key, new_price)
        });
        if !stored {
            debug!(user = %user, key = %key, "[bv-04] Entry changed during pass, price kept");
        }
        report.changed += 1;
    }

    async fn notify(&self, user: &UserId, notice: &PriceChangeNotice) -> Result<(), NotifyError> {
        let after = self.config.notify_timeout;
        tokio::time::timeout(after, self.sink.notify(user, notice))
            .await
            .map_err(|_| NotifyError::Timeout { after })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingNotificationSink;
    use bv_02_catalog::InMemoryCatalog;
    use shared_types::{Card, CardKey, CardPrices, ManualTimeSource};

    fn card(key: &CardKey, price: f64) -> Card {
        Card {
            key: key.clone(),
            name: "Charizard".into(),
            rarity: Some("Rare Holo".into()),
            image_url: None,
            prices: CardPrices {
                average_sell: Some(price),
                ..Default::default()
            },
        }
    }

    struct Fixture {
        store: Arc<StateStore>,
        catalog: Arc<InMemoryCatalog>,
        sink: Arc<RecordingNotificationSink>,
        reconciler: PriceReconciler,
    }

    fn fixture(config: ReconcilerConfig) -> Fixture {
        let store = Arc::new(StateStore::in_memory());
        let catalog = Arc::new(InMemoryCatalog::new());
        let sink = Arc::new(RecordingNotificationSink::new());
        let reconciler = PriceReconciler::new(
            store.clone(),
            catalog.clone(),
            sink.clone(),
            Arc::new(ManualTimeSource::new(7)),
            config,
        );
        Fixture {
            store,
            catalog,
            sink,
            reconciler,
        }
    }

    fn key(s: &str) -> CardKey {
        s.parse().unwrap()
    }

    fn watch(store: &StateStore, user: &str, key: &CardKey, price: f64) {
        let entry = WatchEntry::new(key.clone(), price);
        store.update(|w: &mut Watches| w.insert(&UserId::new(user), entry));
    }

    fn stored_price(store: &StateStore, user: &str, key: &CardKey) -> Option<f64> {
        store
            .load::<Watches>()
            .get(&UserId::new(user), key)
            .map(|e| e.last_price)
    }

    #[tokio::test]
    async fn test_change_notifies_once_and_persists() {
        let f = fixture(ReconcilerConfig::default());
        let k = key("BASE1/4");
        f.catalog.add_cards([card(&k, 12.0)]);
        watch(&f.store, "u1", &k, 10.0);

        let report = f.reconciler.tick().await;

        assert_eq!(report.changed, 1);
        let sent = f.sink.take();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].user, UserId::new("u1"));
        assert_eq!(sent[0].notice.old_price, 10.0);
        assert_eq!(sent[0].notice.new_price, 12.0);
        assert_eq!(stored_price(&f.store, "u1", &k), Some(12.0));

        let again = f.reconciler.tick().await;
        assert_eq!(again.unchanged, 1);
        assert!(f.sink.sent().is_empty());
        assert_eq!(f.reconciler.last_tick(), Some((7, again)));
    }

    #[tokio::test]
    async fn test_failing_entry_does_not_block_siblings() {
        let f = fixture(ReconcilerConfig::default());
        let bad = key("SV1/1");
        let good = key("SV1/2");
        f.catalog.add_cards([card(&bad, 3.0), card(&good, 5.0)]);
        f.catalog.set_failing(&bad, true);
        watch(&f.store, "u1", &bad, 1.0);
        watch(&f.store, "u1", &good, 1.0);

        let report = f.reconciler.tick().await;

        assert_eq!(report.checked, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.changed, 1);
        assert_eq!(stored_price(&f.store, "u1", &bad), Some(1.0));
        assert_eq!(stored_price(&f.store, "u1", &good), Some(5.0));
    }

    #[tokio::test]
    async fn test_failed_notification_keeps_old_price() {
        let f = fixture(ReconcilerConfig::default());
        let k = key("SV1/3");
        f.catalog.add_cards([card(&k, 2.0)]);
        watch(&f.store, "u1", &k, 1.0);
        f.sink.set_failing(true);

        let report = f.reconciler.tick().await;

        assert_eq!(report.notify_failures, 1);
        assert_eq!(report.changed, 0);
        assert_eq!(stored_price(&f.store, "u1", &k), Some(1.0));

        f.sink.set_failing(false);
        assert_eq!(f.reconciler.tick().await.changed, 1);
        assert_eq!(stored_price(&f.store, "u1", &k), Some(2.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_sink_times_out() {
        let f = fixture(ReconcilerConfig {
            notify_timeout: Duration::from_millis(100),
            ..Default::default()
        });
        let k = key("SV1/3");
        f.catalog.add_cards([card(&k, 2.0)]);
        watch(&f.store, "u1", &k, 1.0);
        f.sink.set_delay(Some(Duration::from_secs(60)));

        let report = f.reconciler.tick().await;

        assert_eq!(report.notify_failures, 1);
        assert!(f.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_missing_card_pruned_after_threshold() {
        let f = fixture(ReconcilerConfig {
            prune_after_misses: 2,
            ..Default::default()
        });
        let k = key("SV9/404");
        watch(&f.store, "u1", &k, 1.0);

        let first = f.reconciler.tick().await;
        assert_eq!(first.skipped, 1);
        assert!(stored_price(&f.store, "u1", &k).is_some());

        let second = f.reconciler.tick().await;
        assert_eq!(second.pruned, 1);
        assert!(f.store.load::<Watches>().is_empty());
        assert!(f.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_outage_never_prunes() {
        let f = fixture(ReconcilerConfig {
            prune_after_misses: 1,
            ..Default::default()
        });
        let k = key("SV1/5");
        watch(&f.store, "u1", &k, 1.0);
        f.catalog.set_offline(true);

        for _ in 0..3 {
            let report = f.reconciler.tick().await;
            assert_eq!(report.skipped, 1);
            assert_eq!(report.pruned, 0);
        }
        assert_eq!(stored_price(&f.store, "u1", &k), Some(1.0));
    }

    #[tokio::test]
    async fn test_missing_price_reads_as_zero() {
        let f = fixture(ReconcilerConfig::default());
        let k = key("SV1/6");
        let mut unpriced = card(&k, 0.0);
        unpriced.prices = CardPrices::default();
        f.catalog.add_cards([unpriced]);
        watch(&f.store, "u1", &k, 0.5);

        f.reconciler.tick().await;

        assert_eq!(f.sink.sent()[0].notice.new_price, 0.0);
        assert_eq!(stored_price(&f.store, "u1", &k), Some(0.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_passes_notify_once() {
        let f = fixture(ReconcilerConfig::default());
        let k = key("SV1/8");
        f.catalog.add_cards([card(&k, 12.0)]);
        watch(&f.store, "u1", &k, 10.0);
        f.sink.set_delay(Some(Duration::from_millis(100)));

        let (a, b) = tokio::join!(f.reconciler.tick(), f.reconciler.tick());

        assert_eq!(a.changed + b.changed, 1);
        assert_eq!(a.unchanged + b.unchanged, 1);
        assert_eq!(f.sink.sent().len(), 1);
        assert_eq!(stored_price(&f.store, "u1", &k), Some(12.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rewatch_during_pass_keeps_new_price() {
        let f = fixture(ReconcilerConfig::default());
        let k = key("SV1/9");
        f.catalog.add_cards([card(&k, 12.0)]);
        watch(&f.store, "u1", &k, 10.0);
        f.sink.set_delay(Some(Duration::from_millis(100)));

        let rewatch = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            f.store.update(|w: &mut Watches| w.remove(&UserId::new("u1"), &k));
            watch(&f.store, "u1", &k, 50.0);
        };
        let (report, ()) = tokio::join!(f.reconciler.tick(), rewatch);

        assert_eq!(report.changed, 1);
        assert_eq!(stored_price(&f.store, "u1", &k), Some(50.0));
    }

    #[tokio::test]
    async fn test_same_card_watched_by_two_users() {
        let f = fixture(ReconcilerConfig::default());
        let k = key("SV1/7");
        f.catalog.add_cards([card(&k, 9.0)]);
        watch(&f.store, "u1", &k, 8.0);
        watch(&f.store, "u2", &k, 9.0);

        let report = f.reconciler.tick().await;

        assert_eq!(report.changed, 1);
        assert_eq!(report.unchanged, 1);
        assert_eq!(f.sink.sent()[0].user, UserId::new("u1"));
    }
}
