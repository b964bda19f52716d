use std::time::{Duration, Instant};

/// one CHIP-8 tick is 1/60th of a second
pub const TICK: Duration = Duration::from_nanos(1_000_000_000 / 60);

/// A 60Hz down-counter kept by the host. Instead of decrementing, it remembers
/// what was written and when, and works out what's left on demand.
#[derive(Debug, Clone, Copy)]
pub struct CountdownTimer {
    value: u8,
    written_at: Instant,
}

impl CountdownTimer {
    pub fn new(now: Instant) -> Self {
        CountdownTimer {
            value: 0,
            written_at: now,
        }
    }

    pub fn set(&mut self, value: u8, now: Instant) {
        self.value = value;
        self.written_at = now;
    }

    /// ticks left, rounded to the nearest tick and never below zero
    pub fn remaining(&self, now: Instant) -> u8 {
        let elapsed = now.saturating_duration_since(self.written_at);
        let ticks = (elapsed.as_secs_f64() / TICK.as_secs_f64()).round();
        (self.value as f64 - ticks).max(0.0) as u8
    }

    pub fn is_running(&self, now: Instant) -> bool {
        self.remaining(now) > 0
    }
}
