//! Time sources for rate limiters.
//!
//! Every limiter reads the current time from a [`Clock`] it owns instead of
//! calling the system clock directly. Readings are monotonic milliseconds
//! measured from an arbitrary origin; only differences between readings and
//! their position relative to window boundaries matter.
//!
//! - [`MonotonicClock`] is backed by [`std::time::Instant`] and is the default.
//! - [`ManualClock`] only moves when told to, which makes tests deterministic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Millisecond timestamp as seen by a limiter.
pub type Millis = u64;

/// A monotonic millisecond time source.
///
/// Implementations must never go backwards. Limiters treat a reading that is
/// earlier than their stored state as zero elapsed time.
pub trait Clock: Send + Sync {
    /// Returns the current reading in milliseconds.
    fn now_millis(&self) -> Millis;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline(always)]
    fn now_millis(&self) -> Millis {
        (**self).now_millis()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline(always)]
    fn now_millis(&self) -> Millis {
        (**self).now_millis()
    }
}

/// Real time source: milliseconds elapsed since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline(always)]
    fn now_millis(&self) -> Millis {
        // u64 milliseconds cover ~584 million years of uptime.
        self.origin.elapsed().as_millis() as Millis
    }
}

/// A clock that only advances when asked to.
///
/// Clones share the same underlying reading, so a test can hand one clone to
/// a limiter and keep another to move time forward.
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::clock::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new(0);
/// let handle = clock.clone();
///
/// handle.advance(Duration::from_millis(250));
/// assert_eq!(clock.now_millis(), 250);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock reading `start` milliseconds.
    pub fn new(start: Millis) -> Self {
        ManualClock {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the clock forward by `by`, saturating at `u64::MAX` milliseconds.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(by))
            });
    }

    /// Moves the clock forward by `ms` milliseconds.
    pub fn advance_millis(&self, ms: Millis) {
        self.advance(Duration::from_millis(ms));
    }

    /// Sets the reading to `ms`. Setting it backwards violates the [`Clock`]
    /// contract and is ignored.
    pub fn set_millis(&self, ms: Millis) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    #[inline(always)]
    fn now_millis(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(10);
        let other = clock.clone();
        other.advance_millis(5);
        assert_eq!(clock.now_millis(), 15);
    }

    #[test]
    fn manual_clock_never_goes_backwards() {
        let clock = ManualClock::new(100);
        clock.set_millis(50);
        assert_eq!(clock.now_millis(), 100);
        clock.set_millis(150);
        assert_eq!(clock.now_millis(), 150);
    }

    #[test]
    fn manual_clock_saturates() {
        let clock = ManualClock::new(u64::MAX - 1);
        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now_millis(), u64::MAX);
    }

    #[test]
    fn monotonic_clock_does_not_decrease() {
        let clock = MonotonicClock::new();
        let a = clock.now_millis();
        let b = clock.now_millis();
        assert!(b >= a);
    }

    #[test]
    fn shared_clock_through_arc() {
        let clock = Arc::new(ManualClock::new(7));
        assert_eq!(Clock::now_millis(&clock), 7);
    }
}
