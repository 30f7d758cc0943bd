use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::{Clock, Millis, MonotonicClock};
use crate::error::{ensure_positive, RateLimitError, Result};
use crate::rate_limiter::RateLimiter;

/// Sliding window counter rate limiter.
///
/// Approximates [`SlidingWindowLog`](super::SlidingWindowLog) in constant
/// memory. Only two fixed-window counts are kept: the current window and the
/// one right before it. The previous window's count is weighted by the share
/// of the trailing window that still overlaps it.
///
/// # Weighted Count
///
/// With `w = window_size_ms` and `overlap = (now % w) / w`, the fraction of the
/// current window already elapsed:
///
/// ```text
/// weighted = previous * (1 - overlap) + current
/// ```
///
/// A request is admitted while `weighted < max_requests`. The estimate assumes
/// the previous window's requests were spread evenly, so it can over- or
/// under-admit slightly compared to the exact log.
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::clock::ManualClock;
/// use rate_guard_strategies::rate_limiters::SlidingWindowCounter;
///
/// let clock = ManualClock::new(0);
/// let counter = SlidingWindowCounter::with_clock(1000, 3, clock.clone()).unwrap();
///
/// let results: Vec<bool> = (0..4).map(|_| counter.try_consume()).collect();
/// assert_eq!(results, [true, true, true, false]);
///
/// // Halfway through the next window the previous 3 weigh 1.5
/// clock.advance_millis(1500);
/// assert!(counter.try_consume());
/// ```
#[derive(Debug)]
pub struct SlidingWindowCounter<C: Clock = MonotonicClock> {
    window_size_ms: u64,
    max_requests: u64,
    clock: C,
    state: Mutex<SlidingWindowCounterState>,
}

/// The window id -> count mapping, limited to the current window and its
/// predecessor.
#[derive(Debug, Clone, Copy)]
struct SlidingWindowCounterState {
    window_id: u64,
    current: u64,
    /// Count of `window_id - 1`
    previous: u64,
}

impl SlidingWindowCounterState {
    /// Moves the state forward to `window_id`, dropping windows older than
    /// `window_id - 1`.
    #[inline(always)]
    fn rotate(&mut self, window_id: u64) -> bool {
        if window_id <= self.window_id {
            return false;
        }
        self.previous = if window_id - self.window_id == 1 {
            self.current
        } else {
            0
        };
        self.current = 0;
        self.window_id = window_id;
        true
    }
}

impl SlidingWindowCounter {
    /// Creates a sliding window counter driven by the real monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfiguration`] if either parameter is zero.
    pub fn new(window_size_ms: u64, max_requests: u64) -> Result<Self> {
        Self::with_clock(window_size_ms, max_requests, MonotonicClock::new())
    }
}

impl<C: Clock> SlidingWindowCounter<C> {
    /// Creates a sliding window counter that reads time from `clock`.
    pub fn with_clock(window_size_ms: u64, max_requests: u64, clock: C) -> Result<Self> {
        let window_size_ms = ensure_positive("window_size_ms", window_size_ms)?;
        let max_requests = ensure_positive("max_requests", max_requests)?;
        let window_id = clock.now_millis() / window_size_ms;

        debug!(window_size_ms, max_requests, "sliding window counter created");

        Ok(SlidingWindowCounter {
            window_size_ms,
            max_requests,
            clock,
            state: Mutex::new(SlidingWindowCounterState {
                window_id,
                current: 0,
                previous: 0,
            }),
        })
    }

    /// Admits the request while the weighted count is below `max_requests`.
    #[inline]
    pub fn try_consume(&self) -> bool {
        let mut state = self.state.lock();
        let now = self.clock.now_millis();

        if state.rotate(now / self.window_size_ms) {
            trace!(
                window_id = state.window_id,
                previous = state.previous,
                "sliding window counter rotated"
            );
        }

        let weighted = self.weighted(&state, now);
        if weighted < self.max_requests as f64 {
            state.current += 1;
            trace!(weighted, current = state.current, "sliding window counter admitted request");
            true
        } else {
            trace!(weighted, "sliding window counter rejected request");
            false
        }
    }

    /// The weighted count the next call would be judged against.
    /// Does not modify the counter.
    pub fn weighted_count(&self) -> f64 {
        let mut snapshot = *self.state.lock();
        let now = self.clock.now_millis();
        snapshot.rotate(now / self.window_size_ms);
        self.weighted(&snapshot, now)
    }

    /// `(previous, current)` window counts as of the current reading, i.e. the
    /// unweighted components of [`weighted_count`](Self::weighted_count).
    pub fn window_counts(&self) -> (u64, u64) {
        let mut snapshot = *self.state.lock();
        snapshot.rotate(self.clock.now_millis() / self.window_size_ms);
        (snapshot.previous, snapshot.current)
    }

    pub fn window_size_ms(&self) -> u64 {
        self.window_size_ms
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }

    #[inline(always)]
    fn weighted(&self, state: &SlidingWindowCounterState, now: Millis) -> f64 {
        let overlap = (now % self.window_size_ms) as f64 / self.window_size_ms as f64;
        state.previous as f64 * (1.0 - overlap) + state.current as f64
    }
}

impl<C: Clock> RateLimiter for SlidingWindowCounter<C> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        self.try_consume()
    }

    fn algorithm(&self) -> &'static str {
        "sliding_window_counter"
    }
}

/// Configuration structure for creating a [`SlidingWindowCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlidingWindowCounterConfig {
    /// Length of each fixed window in milliseconds.
    pub window_size_ms: u64,
    /// Requests admitted within the approximated trailing window.
    pub max_requests: u64,
}

impl SlidingWindowCounterConfig {
    pub fn new(window_size_ms: u64, max_requests: u64) -> Self {
        Self {
            window_size_ms,
            max_requests,
        }
    }
}

impl TryFrom<SlidingWindowCounterConfig> for SlidingWindowCounter {
    type Error = RateLimitError;

    fn try_from(config: SlidingWindowCounterConfig) -> Result<Self> {
        SlidingWindowCounter::new(config.window_size_ms, config.max_requests)
    }
}
