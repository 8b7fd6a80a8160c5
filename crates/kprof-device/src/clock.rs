//! Timestamp sources.
//!
//! Timestamps are the low 32 bits of a nanosecond counter. They are
//! non-decreasing within one launch and wrap at 2^32; unwrapping is left to
//! the decoder.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// Monotonic counter read by the event writer.
pub trait Clock: Sync {
    /// Low 32 bits of the current counter value.
    fn read_timestamp(&self) -> u32;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn read_timestamp(&self) -> u32 {
        (**self).read_timestamp()
    }
}

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Process-wide nanosecond timer.
///
/// Counts from the first read in the process, so every group of a launch
/// shares one time base.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalTimer;

impl GlobalTimer {
    /// Start of the shared time base.
    #[must_use]
    pub fn epoch() -> Instant {
        *EPOCH.get_or_init(Instant::now)
    }
}

impl Clock for GlobalTimer {
    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    fn read_timestamp(&self) -> u32 {
        // Truncation to the low half is the wire format.
        Self::epoch().elapsed().as_nanos() as u32
    }
}

/// Deterministic clock for tests and simulations.
///
/// Each read returns the current value and then advances it by `step`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU32,
    step: u32,
}

impl ManualClock {
    /// Clock frozen at `start` until [`set`](Self::set) or
    /// [`advance`](Self::advance) is called.
    #[must_use]
    pub const fn new(start: u32) -> Self {
        Self::ticking(start, 0)
    }

    /// Clock that advances by `step` after every read.
    #[must_use]
    pub const fn ticking(start: u32, step: u32) -> Self {
        Self {
            now: AtomicU32::new(start),
            step,
        }
    }

    pub fn set(&self, now: u32) {
        self.now.store(now, Ordering::Relaxed);
    }

    /// Advance by `delta` (wrapping) and return the new value.
    pub fn advance(&self, delta: u32) -> u32 {
        self.now.fetch_add(delta, Ordering::Relaxed).wrapping_add(delta)
    }

    pub fn now(&self) -> u32 {
        self.now.load(Ordering::Relaxed)
    }
}

impl Clock for ManualClock {
    #[inline]
    fn read_timestamp(&self) -> u32 {
        if self.step == 0 {
            self.now.load(Ordering::Relaxed)
        } else {
            self.now.fetch_add(self.step, Ordering::Relaxed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_timer_non_decreasing() {
        let timer = GlobalTimer;
        let a = timer.read_timestamp();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let b = timer.read_timestamp();
        assert!(b.wrapping_sub(a) >= 1_000_000);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(100);
        assert_eq!(clock.read_timestamp(), 100);
        assert_eq!(clock.read_timestamp(), 100);
        assert_eq!(clock.advance(40), 140);
        assert_eq!(clock.read_timestamp(), 140);
        clock.set(7);
        assert_eq!(clock.now(), 7);
    }

    #[test]
    fn test_ticking_clock() {
        let clock = ManualClock::ticking(10, 5);
        assert_eq!(clock.read_timestamp(), 10);
        assert_eq!(clock.read_timestamp(), 15);
        assert_eq!((&clock).read_timestamp(), 20);
    }

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::new(u32::MAX);
        assert_eq!(clock.advance(2), 1);
    }
}
