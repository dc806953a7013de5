use std::time::{Duration, Instant};

use tracing::trace;

/// Event posted by a background timer when a refresh period has elapsed.
/// Carries no payload, the consumer re-pulls current state itself.
#[derive(Debug, Clone, Copy)]
pub struct Trigger;

/// Idle/Due state machine deciding when the dashboard consumer should
/// re-pull and redisplay the buffer.
///
/// A trigger fires only when the scheduler is enabled AND the refresh
/// interval has elapsed since the last trigger. The enabled flag is
/// checked first, so disabling auto-refresh is observed by the very next
/// scheduling decision.
#[derive(Debug, Clone)]
pub struct RefreshScheduler {
    enabled: bool,
    interval: Duration,
    last_trigger: Instant,
}

impl RefreshScheduler {
    pub fn new(interval: Duration) -> Self {
        Self::with_start(interval, Instant::now())
    }

    /// Start the cadence window at an explicit instant.
    pub fn with_start(interval: Duration, now: Instant) -> Self {
        Self {
            enabled: true,
            interval,
            last_trigger: now,
        }
    }

    /// Non-mutating probe: would a trigger fire at `now`?
    pub fn is_due_at(&self, now: Instant) -> bool {
        self.enabled && now.duration_since(self.last_trigger) >= self.interval
    }

    pub fn is_due(&self) -> bool {
        self.is_due_at(Instant::now())
    }

    /// Evaluate one scheduling decision. Returns true and restarts the
    /// cadence window at `now` when a trigger is due.
    pub fn evaluate_at(&mut self, now: Instant) -> bool {
        if !self.is_due_at(now) {
            return false;
        }
        self.last_trigger = now;
        trace!(interval_ms = self.interval.as_millis() as u64, "refresh trigger fired");
        true
    }

    pub fn evaluate(&mut self) -> bool {
        self.evaluate_at(Instant::now())
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Remaining wait before the next trigger, for timer tasks.
    /// `None` while disabled, zero when already due.
    pub fn time_until_due_at(&self, now: Instant) -> Option<Duration> {
        if !self.enabled {
            return None;
        }
        let elapsed = now.duration_since(self.last_trigger);
        Some(self.interval.saturating_sub(elapsed))
    }
}
