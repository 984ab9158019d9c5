//! # BV-04: Price Watch
//!
//! Users watch cards; a scheduled pass re-prices every watched card and
//! messages the user when the market price moved.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | `WatchRegistry` | toggle / watch / unwatch / quote |
//! | `PriceReconciler` | one diff-and-notify pass, `TickReport` |
//! | `ReconciliationTask` | periodic scheduling, `start()` / `stop()` |
//! | `NotificationSink` | outbound port: log, broadcast, recording adapters |
//!
//! ## Data Flow
//!
//! ```text
//! ┌──────────────┐  toggle   ┌─────────────┐
//! │ WatchRegistry│──────────►│  Watches    │◄──────────┐
//! └──────────────┘           │ (bv-01)     │           │ set_price / prune
//!                            └──────┬──────┘           │
//!                          snapshot │                  │
//!                                   ▼                  │
//! ┌────────────────────┐  tick  ┌────────────────┐     │
//! │ ReconciliationTask │───────►│ PriceReconciler│─────┘
//! └────────────────────┘        └───┬────────┬───┘
//!                      find_card    │        │ notify
//!                                   ▼        ▼
//!                         CatalogProvider  NotificationSink
//! ```

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use adapters::{BroadcastNotificationSink, LogNotificationSink, RecordingNotificationSink};
pub use application::{
    PriceReconciler, Quote, ReconcilerConfig, ReconciliationHandle, ReconciliationTask,
    TickReport, WatchRegistry,
};
pub use domain::*;
pub use ports::NotificationSink;
