use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::{Clock, Millis, MonotonicClock};
use crate::error::{ensure_positive, RateLimitError, Result};
use crate::rate_limiter::RateLimiter;

/// Fixed window counter rate limiter.
///
/// Time is divided into contiguous windows of `window_size_ms`, aligned to
/// multiples of the window size on the limiter's clock. Each window admits at
/// most `max_requests`; the count resets to zero when a new window starts.
///
/// # Window Boundaries
///
/// - Window 0: `[0, window_size_ms)`
/// - Window 1: `[window_size_ms, 2 * window_size_ms)`
/// - And so on...
///
/// Because the reset is hard, up to `2 * max_requests` requests can be admitted
/// in a short span straddling a boundary: a full window's worth at the tail of
/// one window and another at the head of the next.
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::clock::ManualClock;
/// use rate_guard_strategies::rate_limiters::FixedWindowCounter;
///
/// let clock = ManualClock::new(0);
/// let counter = FixedWindowCounter::with_clock(1000, 3, clock.clone()).unwrap();
///
/// let results: Vec<bool> = (0..4).map(|_| counter.try_consume()).collect();
/// assert_eq!(results, [true, true, true, false]);
///
/// // Next window resets the count
/// clock.advance_millis(1000);
/// assert!(counter.try_consume());
/// ```
#[derive(Debug)]
pub struct FixedWindowCounter<C: Clock = MonotonicClock> {
    window_size_ms: u64,
    max_requests: u64,
    clock: C,
    /// Window id and count rotate together under one lock
    state: Mutex<FixedWindowCounterState>,
}

#[derive(Debug)]
struct FixedWindowCounterState {
    /// `now / window_size_ms` of the active window
    window_id: u64,
    /// Requests admitted in the active window
    count: u64,
}

impl FixedWindowCounter {
    /// Creates a fixed window counter driven by the real monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfiguration`] if either parameter is zero.
    pub fn new(window_size_ms: u64, max_requests: u64) -> Result<Self> {
        Self::with_clock(window_size_ms, max_requests, MonotonicClock::new())
    }
}

impl<C: Clock> FixedWindowCounter<C> {
    /// Creates a fixed window counter that reads time from `clock`.
    pub fn with_clock(window_size_ms: u64, max_requests: u64, clock: C) -> Result<Self> {
        let window_size_ms = ensure_positive("window_size_ms", window_size_ms)?;
        let max_requests = ensure_positive("max_requests", max_requests)?;
        let window_id = clock.now_millis() / window_size_ms;

        debug!(window_size_ms, max_requests, "fixed window counter created");

        Ok(FixedWindowCounter {
            window_size_ms,
            max_requests,
            clock,
            state: Mutex::new(FixedWindowCounterState {
                window_id,
                count: 0,
            }),
        })
    }

    /// Admits the request if the current window still has room.
    ///
    /// A call that lands in a later window than the stored one resets the
    /// count first. The count only grows on admission, so it never exceeds
    /// `max_requests`.
    #[inline]
    pub fn try_consume(&self) -> bool {
        let mut state = self.state.lock();
        let window_id = self.window_id(self.clock.now_millis());

        if window_id > state.window_id {
            trace!(
                from = state.window_id,
                to = window_id,
                "fixed window counter rotated"
            );
            state.window_id = window_id;
            state.count = 0;
        }

        if state.count < self.max_requests {
            state.count += 1;
            trace!(count = state.count, "fixed window counter admitted request");
            true
        } else {
            trace!(count = state.count, "fixed window counter rejected request");
            false
        }
    }

    /// Requests admitted so far in the window containing the current reading.
    pub fn current_count(&self) -> u64 {
        let state = self.state.lock();
        if self.window_id(self.clock.now_millis()) > state.window_id {
            0
        } else {
            state.count
        }
    }

    pub fn window_size_ms(&self) -> u64 {
        self.window_size_ms
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    #[inline(always)]
    fn window_id(&self, now: Millis) -> u64 {
        now / self.window_size_ms
    }
}

impl<C: Clock> RateLimiter for FixedWindowCounter<C> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        self.try_consume()
    }

    fn algorithm(&self) -> &'static str {
        "fixed_window_counter"
    }
}

/// Configuration structure for creating a [`FixedWindowCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedWindowCounterConfig {
    /// Window length in milliseconds.
    pub window_size_ms: u64,
    /// Requests admitted per window.
    pub max_requests: u64,
}

impl FixedWindowCounterConfig {
    pub fn new(window_size_ms: u64, max_requests: u64) -> Self {
        Self {
            window_size_ms,
            max_requests,
        }
    }
}

impl TryFrom<FixedWindowCounterConfig> for FixedWindowCounter {
    type Error = RateLimitError;

    fn try_from(config: FixedWindowCounterConfig) -> Result<Self> {
        FixedWindowCounter::new(config.window_size_ms, config.max_requests)
    }
}
