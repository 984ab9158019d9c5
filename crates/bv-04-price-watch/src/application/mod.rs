pub mod reconciler;
pub mod registry;
pub mod task;

pub use reconciler::{PriceReconciler, ReconcilerConfig, TickReport};
pub use registry::{Quote, WatchRegistry};
pub use task::{ReconciliationHandle, ReconciliationTask};
