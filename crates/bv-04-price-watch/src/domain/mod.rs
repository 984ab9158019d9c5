pub mod errors;
pub mod misses;
pub mod notice;
pub mod toggle;

pub use errors::{NotifyError, WatchError};
pub use misses::{MissTracker, DEFAULT_PRUNE_AFTER_MISSES};
pub use notice::{DirectMessage, PriceChangeNotice};
pub use toggle::WatchToggle;
