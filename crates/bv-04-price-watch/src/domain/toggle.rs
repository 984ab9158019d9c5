/// State of a watch after a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchToggle {
    NowWatching,
    NowUnwatching,
}

impl WatchToggle {
    pub fn is_watching(&self) -> bool {
        matches!(self, WatchToggle::NowWatching)
    }
}
