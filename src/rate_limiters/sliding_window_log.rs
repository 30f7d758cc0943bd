use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::{Clock, Millis, MonotonicClock};
use crate::error::{ensure_positive, RateLimitError, Result};
use crate::rate_limiter::RateLimiter;

/// Sliding window log rate limiter.
///
/// Keeps the timestamp of every admitted request in the trailing window and
/// admits a new one only while fewer than `max_requests` remain. This is the
/// exact sliding window: no boundary bursts, no approximation, at the cost of
/// memory proportional to `max_requests`.
///
/// A timestamp `t` stops counting once `now - window_size_ms >= t`, so a
/// request admitted at tick 0 in a 1000 ms window frees its slot at tick 1000.
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::clock::ManualClock;
/// use rate_guard_strategies::rate_limiters::SlidingWindowLog;
///
/// let clock = ManualClock::new(0);
/// let log = SlidingWindowLog::with_clock(1000, 3, clock.clone()).unwrap();
///
/// let results: Vec<bool> = (0..4).map(|_| log.try_consume()).collect();
/// assert_eq!(results, [true, true, true, false]);
///
/// clock.advance_millis(999);
/// assert!(!log.try_consume());
/// clock.advance_millis(1);
/// assert!(log.try_consume());
/// ```
#[derive(Debug)]
pub struct SlidingWindowLog<C: Clock = MonotonicClock> {
    window_size_ms: u64,
    max_requests: u64,
    clock: C,
    /// Admission timestamps in call order, so oldest first
    log: Mutex<VecDeque<Millis>>,
}

impl SlidingWindowLog {
    /// Creates a sliding window log driven by the real monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfiguration`] if either parameter is zero.
    pub fn new(window_size_ms: u64, max_requests: u64) -> Result<Self> {
        Self::with_clock(window_size_ms, max_requests, MonotonicClock::new())
    }
}

impl<C: Clock> SlidingWindowLog<C> {
    /// Creates a sliding window log that reads time from `clock`.
    pub fn with_clock(window_size_ms: u64, max_requests: u64, clock: C) -> Result<Self> {
        let window_size_ms = ensure_positive("window_size_ms", window_size_ms)?;
        let max_requests = ensure_positive("max_requests", max_requests)?;

        debug!(window_size_ms, max_requests, "sliding window log created");

        Ok(SlidingWindowLog {
            window_size_ms,
            max_requests,
            clock,
            log: Mutex::new(VecDeque::new()),
        })
    }

    /// Prunes expired timestamps, then admits the request if the log has room.
    ///
    /// Pruning runs before the capacity check on every call, rejected ones
    /// included, so a caller spinning on rejections cannot grow the log.
    #[inline]
    pub fn try_consume(&self) -> bool {
        let mut log = self.log.lock();
        let now = self.clock.now_millis();

        if let Some(window_start) = now.checked_sub(self.window_size_ms) {
            let before = log.len();
            while log.front().is_some_and(|&ts| ts <= window_start) {
                log.pop_front();
            }
            if log.len() != before {
                trace!(pruned = before - log.len(), "sliding window log pruned");
            }
        }

        if (log.len() as u64) < self.max_requests {
            log.push_back(now);
            trace!(logged = log.len(), "sliding window log admitted request");
            true
        } else {
            trace!(logged = log.len(), "sliding window log rejected request");
            false
        }
    }

    /// Number of logged admissions still inside the window ending now.
    /// Does not prune.
    pub fn logged(&self) -> usize {
        let log = self.log.lock();
        match self.clock.now_millis().checked_sub(self.window_size_ms) {
            Some(window_start) => log.iter().filter(|&&ts| ts > window_start).count(),
            None => log.len(),
        }
    }

    pub fn window_size_ms(&self) -> u64 {
        self.window_size_ms
    }

    pub fn max_requests(&self) -> u64 {
        self.max_requests
    }
}

impl<C: Clock> RateLimiter for SlidingWindowLog<C> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        self.try_consume()
    }

    fn algorithm(&self) -> &'static str {
        "sliding_window_log"
    }
}

/// Configuration structure for creating a [`SlidingWindowLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlidingWindowLogConfig {
    /// Length of the trailing window in milliseconds.
    pub window_size_ms: u64,
    /// Requests admitted within any trailing window.
    pub max_requests: u64,
}

impl SlidingWindowLogConfig {
    pub fn new(window_size_ms: u64, max_requests: u64) -> Self {
        Self {
            window_size_ms,
            max_requests,
        }
    }
}

impl TryFrom<SlidingWindowLogConfig> for SlidingWindowLog {
    type Error = RateLimitError;

    fn try_from(config: SlidingWindowLogConfig) -> Result<Self> {
        SlidingWindowLog::new(config.window_size_ms, config.max_requests)
    }
}
