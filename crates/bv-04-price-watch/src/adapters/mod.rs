pub mod broadcast;
pub mod log;
pub mod recording;

pub use broadcast::{BroadcastNotificationSink, DEFAULT_CHANNEL_CAPACITY};
pub use log::LogNotificationSink;
pub use recording::RecordingNotificationSink;
