//! Gate state — the mutable temporal part of a rule.
//!
//! Kept apart from the immutable rule configuration so a configuration
//! reload can swap rules without losing cooldown or delay progress.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::time::{Millis, duration_millis};

/// Firing history of one rule, in epoch milliseconds (`0` = never).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateState {
    trigger_time: Millis,
    delay_trigger_time: Millis,
}

/// Where a rule currently stands, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// Never fired and not parked.
    Idle,
    /// Fired before; cooldown has expired.
    Ready,
    /// Fired recently; cooldown still running.
    CoolingDown,
    /// Parked; the delay window has not elapsed yet.
    Delayed,
}

impl GateState {
    #[must_use]
    pub fn trigger_time(&self) -> Millis {
        self.trigger_time
    }

    #[must_use]
    pub fn delay_trigger_time(&self) -> Millis {
        self.delay_trigger_time
    }

    /// Cooldown has elapsed: `now > trigger_time + cd`.
    #[must_use]
    pub fn is_active(&self, now: Millis, cd: Duration) -> bool {
        now > self.trigger_time.saturating_add(duration_millis(cd))
    }

    /// The rule has been parked and not fired since.
    #[must_use]
    pub fn is_parked(&self) -> bool {
        self.delay_trigger_time != 0
    }

    /// Parked and `now < delay_trigger_time + delay`.
    #[must_use]
    pub fn is_within_delay(&self, now: Millis, delay: Duration) -> bool {
        self.is_parked() && now < self.delay_trigger_time.saturating_add(duration_millis(delay))
    }

    /// Allowed to fire: active and not inside a delay window.
    #[must_use]
    pub fn is_eligible(&self, now: Millis, cd: Duration, delay: Duration) -> bool {
        self.is_active(now, cd) && !self.is_within_delay(now, delay)
    }

    /// Record a firing at `now`. Clears any parking.
    pub fn mark_triggered(&mut self, now: Millis) {
        self.trigger_time = now;
        self.delay_trigger_time = 0;
    }

    /// Park the rule at `now` without touching the firing history.
    pub fn mark_delayed(&mut self, now: Millis) {
        self.delay_trigger_time = now;
    }

    #[must_use]
    pub fn phase(&self, now: Millis, cd: Duration, delay: Duration) -> GatePhase {
        if self.is_within_delay(now, delay) {
            GatePhase::Delayed
        } else if !self.is_active(now, cd) {
            GatePhase::CoolingDown
        } else if self.trigger_time == 0 {
            GatePhase::Idle
        } else {
            GatePhase::Ready
        }
    }
}
