//! Interrupt-fed pulse counter.
//!
//! One writer (the tachometer GPIO ISR) increments; one reader (the main
//! loop's tachometer read) drains.  Both sides go through a
//! `critical_section::Mutex`, so on the single-core path the drain masks
//! interrupts for exactly the copy-and-clear and nothing else.  The
//! closure form of `critical_section::with` restores interrupts on every
//! exit, including a zero count.

use core::cell::Cell;

use critical_section::Mutex;

/// Shared event counter.  `const`-constructible so firmware can keep one
/// in a `static` and hand the ISR a `&'static` reference.
pub struct PulseCounter {
    count: Mutex<Cell<u16>>,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: Mutex::new(Cell::new(0)),
        }
    }

    /// Count one edge.  Interrupt context only: no allocation, no logging,
    /// bounded time.  Saturates at `u16::MAX` rather than wrapping.
    #[inline]
    pub fn increment(&self) {
        critical_section::with(|cs| {
            let c = self.count.borrow(cs);
            c.set(c.get().saturating_add(1));
        });
    }

    /// Atomically take the count accumulated since the last drain and
    /// reset it to zero.  Main-loop context only.
    pub fn read_and_reset(&self) -> u16 {
        critical_section::with(|cs| self.count.borrow(cs).replace(0))
    }

    /// Current count without resetting it.
    pub fn peek(&self) -> u16 {
        critical_section::with(|cs| self.count.borrow(cs).get())
    }
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new()
    }
}
