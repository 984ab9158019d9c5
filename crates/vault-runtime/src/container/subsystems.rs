//! # Subsystem Container
//!
//! Builds every service once, in dependency order, and hands out shared
//! references.
//!
//! ```text
//! Level 0: clock, StateStore (bv-01), CatalogProvider + timeout (bv-02)
//! Level 1: SetCatalog (bv-02)
//! Level 2: PackOpeningService (bv-03), WatchRegistry + PriceReconciler (bv-04)
//! Level 3: CollectionQueries (bv-05)
//! ```

use std::sync::Arc;

use bv_01_state_store::StateStore;
use bv_02_catalog::{
    CatalogError, CatalogProvider, PokemonTcgClient, PokemonTcgConfig, SetCatalog, TimeoutCatalog,
};
use bv_03_pack_opening::{PackLayout, PackOpeningConfig, PackOpeningService};
use bv_04_price_watch::{
    LogNotificationSink, NotificationSink, PriceReconciler, ReconcilerConfig, WatchRegistry,
};
use bv_05_collection_queries::CollectionQueries;
use shared_types::{SystemTimeSource, TimeSource};
use tracing::info;

use crate::container::config::VaultConfig;

pub struct SubsystemContainer {
    pub store: Arc<StateStore>,
    /// Provider with every call bounded by `catalog.timeout`.
    pub catalog: Arc<dyn CatalogProvider>,
    pub sets: Arc<SetCatalog>,
    pub packs: Arc<PackOpeningService>,
    pub watches: Arc<WatchRegistry>,
    pub reconciler: Arc<PriceReconciler>,
    pub queries: Arc<CollectionQueries>,
    pub clock: Arc<dyn TimeSource>,
    pub config: VaultConfig,
}

impl SubsystemContainer {
    /// Production wiring: Pokémon TCG API, log notifications, system clock.
    pub fn new(config: VaultConfig) -> Result<Self, CatalogError> {
        let client = PokemonTcgClient::new(PokemonTcgConfig {
            base_url: config.catalog.base_url.clone(),
            api_key: config.catalog.api_key.clone(),
            request_timeout: config.catalog.timeout,
            ..PokemonTcgConfig::default()
        })?;

        Ok(Self::with_parts(
            config,
            Arc::new(client),
            Arc::new(LogNotificationSink),
            Arc::new(SystemTimeSource),
        ))
    }

    /// Wire the subsystems around caller-supplied collaborators.
    pub fn with_parts(
        config: VaultConfig,
        provider: Arc<dyn CatalogProvider>,
        sink: Arc<dyn NotificationSink>,
        clock: Arc<dyn TimeSource>,
    ) -> Self {
        info!(data_dir = ?config.storage.data_dir, "Initializing vault subsystems");

        let store = Arc::new(StateStore::open(&config.storage.data_dir));
        let catalog: Arc<dyn CatalogProvider> =
            Arc::new(TimeoutCatalog::new(provider, config.catalog.timeout));
        info!("  [bv-01] State store ready");

        let sets = Arc::new(SetCatalog::new(Arc::clone(&catalog), Arc::clone(&clock)));
        info!("  [bv-02] Catalog ready (timeout {:?})", config.catalog.timeout);

        let packs = Arc::new(PackOpeningService::new(
            Arc::clone(&store),
            Arc::clone(&catalog),
            Arc::clone(&clock),
            PackOpeningConfig {
                cooldown: config.packs.cooldown,
                layout: PackLayout::default(),
            },
        ));
        info!("  [bv-03] Pack opening ready (cooldown {:?})", config.packs.cooldown);

        let watches = Arc::new(WatchRegistry::new(
            Arc::clone(&store),
            Arc::clone(&catalog),
            config.catalog.language.clone(),
        ));
        let reconciler = Arc::new(PriceReconciler::new(
            Arc::clone(&store),
            Arc::clone(&catalog),
            sink,
            Arc::clone(&clock),
            ReconcilerConfig {
                notify_timeout: config.prices.notify_timeout,
                prune_after_misses: config.prices.prune_after_misses,
                preferred_language: config.catalog.language.clone(),
            },
        ));
        info!("  [bv-04] Price watch ready");

        let queries = Arc::new(CollectionQueries::new(Arc::clone(&store)));
        info!("  [bv-05] Queries ready");

        Self {
            store,
            catalog,
            sets,
            packs,
            watches,
            reconciler,
            queries,
            clock,
            config,
        }
    }
}
