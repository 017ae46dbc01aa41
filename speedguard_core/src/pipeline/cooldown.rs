// speedguard_core/src/pipeline/cooldown.rs

use crate::types::Millis;

/// Minimum time between two alerts, in milliseconds.
pub const DEFAULT_COOLDOWN_MS: Millis = 5_000;

/// Rate limiter that lets at most one alert through per interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertCooldown {
    interval_ms: Millis,
    last_trigger_ms: Option<Millis>,
}

impl AlertCooldown {
    pub fn new(interval_ms: Millis) -> Self {
        Self {
            interval_ms,
            last_trigger_ms: None,
        }
    }

    pub fn interval_ms(&self) -> Millis {
        self.interval_ms
    }

    pub fn last_trigger_ms(&self) -> Option<Millis> {
        self.last_trigger_ms
    }

    /// Time left before the next alert may fire. Zero when ready.
    /// A clock that went backwards counts as no time elapsed.
    pub fn remaining_ms(&self, now_ms: Millis) -> Millis {
        match self.last_trigger_ms {
            None => 0,
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                self.interval_ms.saturating_sub(elapsed)
            }
        }
    }

    pub fn is_ready(&self, now_ms: Millis) -> bool {
        self.remaining_ms(now_ms) == 0
    }

    /// Records a trigger at `now_ms` if the cool-down allows one.
    pub fn try_trigger(&mut self, now_ms: Millis) -> bool {
        if !self.is_ready(now_ms) {
            return false;
        }
        self.last_trigger_ms = Some(now_ms);
        true
    }

    pub fn reset(&mut self) {
        self.last_trigger_ms = None;
    }
}

impl Default for AlertCooldown {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN_MS)
    }
}
