//! # Pack Cooldown
//!
//! Fixed-window limiter: one pack per user per window. The policy is pure
//! logic over the last-use timestamp held in [`Cooldowns`]; persistence is
//! the caller's business.

use std::time::Duration;

use bv_01_state_store::Cooldowns;
use shared_types::{Timestamp, UserId};

/// Default window between two openings of the same user.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(60 * 60);

/// Outcome of a cooldown check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    Allowed,
    Denied { remaining: Duration },
}

impl CooldownDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, CooldownDecision::Allowed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownPolicy {
    window: Duration,
}

impl Default for CooldownPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}

impl CooldownPolicy {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Decide without recording anything.
    ///
    /// A last use stamped in the future counts as zero elapsed time.
    pub fn check(&self, last_use: Option<Timestamp>, now: Timestamp) -> CooldownDecision {
        let Some(last) = last_use else {
            return CooldownDecision::Allowed;
        };

        let elapsed = Duration::from_millis(now.saturating_sub(last));
        if elapsed < self.window {
            CooldownDecision::Denied {
                remaining: self.window - elapsed,
            }
        } else {
            CooldownDecision::Allowed
        }
    }

    /// Check `user` and, when allowed, record `now` as their last use.
    pub fn check_and_consume(
        &self,
        cooldowns: &mut Cooldowns,
        user: &UserId,
        now: Timestamp,
    ) -> CooldownDecision {
        let decision = self.check(cooldowns.last_use(user), now);
        if decision.is_allowed() {
            cooldowns.record(user, now);
        }
        decision
    }
}

/// Render a remaining wait as `"{m}m{s}s"`.
pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}m{}s", secs / 60, secs % 60)
}
