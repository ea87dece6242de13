//! Fixed-interval cadence for the cooperative control loop.
//!
//! ```text
//!   loop ──▶ IntervalTimer::poll(now_ms) ──▶ true ──▶ emit telemetry
//!                       │
//!                       └──▶ false ──▶ next iteration
//! ```
//!
//! Time is a `u32` millisecond uptime that wraps after ~49.7 days.  All
//! arithmetic is `wrapping_sub`, so the cadence survives the wrap.  The
//! next deadline is measured from the last firing, not from the nominal
//! schedule: a late iteration delays later ones instead of bunching them.

/// Fires once every `interval_ms`, measured from the last firing.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTimer {
    interval_ms: u32,
    last_ms: u32,
}

impl IntervalTimer {
    /// Start the timer at `now_ms`.  The first firing is one full interval
    /// later.  A zero interval is treated as 1 ms.
    pub const fn new(interval_ms: u32, now_ms: u32) -> Self {
        Self {
            interval_ms: if interval_ms == 0 { 1 } else { interval_ms },
            last_ms: now_ms,
        }
    }

    pub const fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Milliseconds since the last firing (or start).
    pub const fn elapsed(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.last_ms)
    }

    /// Milliseconds until the next firing; 0 when due.
    pub const fn remaining(&self, now_ms: u32) -> u32 {
        self.interval_ms.saturating_sub(self.elapsed(now_ms))
    }

    /// `true` (and rearm) if the interval has elapsed.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.elapsed(now_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Restart the interval from `now_ms`.
    pub fn reset(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }
}
