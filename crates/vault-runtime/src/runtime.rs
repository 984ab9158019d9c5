//! # Vault Runtime
//!
//! Owns the subsystem container and the background tasks, and exposes every
//! operation a front-end needs. Errors come back in the shared
//! [`VaultError`] taxonomy.
//!
//! ## Startup
//!
//! 1. Create missing state files with defaults
//! 2. Spawn the set catalog refresher (first refresh immediately)
//! 3. Schedule price reconciliation (first pass after one period)
//!
//! ## Shutdown
//!
//! 1. Signal the refresher through the watch channel
//! 2. Stop the reconciliation task, letting an in-flight pass finish
//! 3. Join the refresher

use std::sync::Arc;
use std::time::Duration;

use bv_01_state_store::{UserStats, WatchEntry};
use bv_02_catalog::{refresh_task, SetListing};
use bv_03_pack_opening::PackOpening;
use bv_04_price_watch::{Quote, ReconciliationHandle, ReconciliationTask, TickReport, WatchToggle};
use bv_05_collection_queries::{BadgeView, InventoryLine, LeaderboardEntry, Profile};
use parking_lot::Mutex;
use shared_types::{CardKey, CardSet, SetId, UserId, VaultError};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{ConfigError, SubsystemContainer, VaultConfig};

/// Bound on joining background tasks at shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Startup failures.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot build catalog client: {0}")]
    Catalog(#[from] bv_02_catalog::CatalogError),
}

pub struct VaultRuntime {
    container: Arc<SubsystemContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    reconciliation: Mutex<Option<ReconciliationHandle>>,
    refresher: Mutex<Option<JoinHandle<()>>>,
}

impl VaultRuntime {
    /// Validate `config` and build the production wiring.
    pub fn new(config: VaultConfig) -> Result<Self, RuntimeError> {
        config.validate()?;
        Ok(Self::from_container(SubsystemContainer::new(config)?))
    }

    pub fn from_container(container: SubsystemContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            reconciliation: Mutex::new(None),
            refresher: Mutex::new(None),
        }
    }

    pub fn container(&self) -> Arc<SubsystemContainer> {
        Arc::clone(&self.container)
    }

    /// Start the background tasks. Calling it twice has no effect.
    pub fn start(&self) {
        let mut reconciliation = self.reconciliation.lock();
        if reconciliation.is_some() {
            warn!("Runtime already started");
            return;
        }

        let config = &self.container.config;
        info!("===========================================");
        info!("  Booster Vault Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.container.store.initialize();

        let refresher = tokio::spawn(refresh_task(
            Arc::clone(&self.container.sets),
            config.catalog.refresh_interval,
            self.shutdown_rx.clone(),
        ));
        *self.refresher.lock() = Some(refresher);

        *reconciliation = Some(
            ReconciliationTask::new(
                Arc::clone(&self.container.reconciler),
                config.prices.check_interval,
            )
            .start(),
        );

        info!("Data Dir: {:?}", config.storage.data_dir);
        info!("Price check every {:?}", config.prices.check_interval);
        info!("Set refresh every {:?}", config.catalog.refresh_interval);
    }

    /// Stop every background task.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        let reconciliation = self.reconciliation.lock().take();
        if let Some(handle) = reconciliation {
            handle.stop().await;
        }

        let refresher = self.refresher.lock().take();
        if let Some(join) = refresher {
            if tokio::time::timeout(SHUTDOWN_GRACE, join).await.is_err() {
                warn!("Set refresher did not stop in time");
            }
        }

        info!("Shutdown complete");
    }

    // =========================================================================
    // PACKS
    // =========================================================================

    pub async fn open_pack(&self, user: &UserId, set: &str) -> Result<PackOpening, VaultError> {
        Ok(self.container.packs.open_pack(user, set).await?)
    }

    pub fn cooldown_remaining(&self, user: &UserId) -> Option<Duration> {
        self.container.packs.cooldown_remaining(user)
    }

    // =========================================================================
    // SETS
    // =========================================================================

    /// Sets matching `filter`, newest first, at most 25.
    pub fn sets(&self, filter: Option<&str>) -> SetListing {
        self.container.sets.filter(filter)
    }

    pub fn autocomplete_sets(&self, query: &str) -> Vec<CardSet> {
        self.container.sets.autocomplete(query)
    }

    /// Re-fetch the set list now.
    pub async fn refresh_sets(&self) -> Result<usize, VaultError> {
        Ok(self.container.sets.refresh().await?)
    }

    // =========================================================================
    // WATCHES
    // =========================================================================

    pub async fn quote(&self, user: &UserId, set: &str, number: &str) -> Result<Quote, VaultError> {
        Ok(self.container.watches.quote(user, set, number).await?)
    }

    pub async fn toggle_watch(&self, user: &UserId, set: &str, number: &str) -> WatchToggle {
        let key = watch_key(set, number);
        self.container.watches.toggle(user, &key).await
    }

    pub async fn watch(&self, user: &UserId, set: &str, number: &str) -> bool {
        let key = watch_key(set, number);
        self.container.watches.watch(user, &key).await
    }

    pub fn unwatch(&self, user: &UserId, set: &str, number: &str) -> bool {
        self.container.watches.unwatch(user, &watch_key(set, number))
    }

    /// Run one reconciliation pass outside the schedule.
    pub async fn check_prices_now(&self) -> TickReport {
        self.container.reconciler.tick().await
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    pub fn inventory(&self, user: &UserId) -> Option<Vec<InventoryLine>> {
        self.container.queries.inventory(user)
    }

    pub fn leaderboard(&self, limit: usize) -> Vec<LeaderboardEntry> {
        self.container.queries.leaderboard(limit)
    }

    pub fn stats(&self, user: &UserId) -> UserStats {
        self.container.queries.stats(user)
    }

    pub fn profile(&self, user: &UserId) -> Profile {
        self.container.queries.profile(user)
    }

    pub fn badges(&self, user: &UserId) -> Vec<BadgeView> {
        self.container.queries.badges(user)
    }

    pub fn watched(&self, user: &UserId) -> Vec<WatchEntry> {
        self.container.queries.watched(user)
    }
}

fn watch_key(set: &str, number: &str) -> CardKey {
    CardKey::new(SetId::normalized(set), number.trim())
}
