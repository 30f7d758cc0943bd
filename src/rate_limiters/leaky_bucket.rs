use std::collections::VecDeque;

use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::{Clock, Millis, MonotonicClock};
use crate::error::{ensure_positive, ensure_positive_rate, RateLimitError, Result};
use crate::rate_limiter::RateLimiter;

/// Leaky bucket rate limiter.
///
/// Models a FIFO queue of at most `capacity` requests that is drained at
/// `processing_rate` requests per second. A request is admitted when the queue
/// has a free slot after draining. Unlike the token bucket, an idle period does
/// not bank extra permits: the bucket can at best become empty.
///
/// # Algorithm Behavior
///
/// - The bucket starts empty
/// - On every call `floor(elapsed_ms * processing_rate / 1000)` entries leave
///   the front of the queue and the drain timer restarts at the current reading
/// - Fractions of a drained request are discarded, not carried to the next
///   call, so frequent callers at low rates see slightly slower draining
/// - If the queue is shorter than `capacity` the request is queued and admitted
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::clock::ManualClock;
/// use rate_guard_strategies::rate_limiters::LeakyBucket;
///
/// let clock = ManualClock::new(0);
/// // Queue of 3, processed at 2 requests per second
/// let bucket = LeakyBucket::with_clock(3, 2.0, clock.clone()).unwrap();
///
/// let results: Vec<bool> = (0..5).map(|_| bucket.try_consume()).collect();
/// assert_eq!(results, [true, true, true, false, false]);
///
/// clock.advance_millis(2000);
/// assert!(bucket.try_consume());
/// ```
#[derive(Debug)]
pub struct LeakyBucket<C: Clock = MonotonicClock> {
    /// Maximum number of queued requests.
    capacity: u64,
    /// Requests drained per second.
    processing_rate: f64,
    clock: C,
    state: Mutex<LeakyBucketState>,
}

/// Relative tolerance applied before flooring the drain count.
const DRAIN_EPSILON: f64 = 1e-12;

#[derive(Debug)]
struct LeakyBucketState {
    /// Admission timestamps, oldest first. Never longer than `capacity`.
    queue: VecDeque<Millis>,
    /// Clock reading of the last drain.
    last_processed_ms: Millis,
}

impl LeakyBucket {
    /// Creates a leaky bucket driven by the real monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfiguration`] if `capacity` is zero or
    /// `processing_rate` is not a finite number greater than zero.
    pub fn new(capacity: u64, processing_rate: f64) -> Result<Self> {
        Self::with_clock(capacity, processing_rate, MonotonicClock::new())
    }
}

impl<C: Clock> LeakyBucket<C> {
    /// Creates a leaky bucket that reads time from `clock`.
    pub fn with_clock(capacity: u64, processing_rate: f64, clock: C) -> Result<Self> {
        let capacity = ensure_positive("capacity", capacity)?;
        let processing_rate = ensure_positive_rate("processing_rate", processing_rate)?;
        let now = clock.now_millis();

        debug!(capacity, processing_rate, "leaky bucket created");

        Ok(LeakyBucket {
            capacity,
            processing_rate,
            clock,
            state: Mutex::new(LeakyBucketState {
                queue: VecDeque::new(),
                last_processed_ms: now,
            }),
        })
    }

    /// Drains the queue for the elapsed time, then queues this request if a
    /// slot is free.
    #[inline]
    pub fn try_consume(&self) -> bool {
        let mut state = self.state.lock();
        let now = self.clock.now_millis();

        let drained = self.drain_count(&state, now);
        if drained > 0 {
            state.queue.drain(..drained);
            trace!(drained, queued = state.queue.len(), "leaky bucket drained");
        }
        state.last_processed_ms = state.last_processed_ms.max(now);

        if (state.queue.len() as u64) < self.capacity {
            state.queue.push_back(now);
            trace!(queued = state.queue.len(), "leaky bucket admitted request");
            true
        } else {
            trace!(queued = state.queue.len(), "leaky bucket rejected request");
            false
        }
    }

    /// Number of requests that would be queued right now, after draining.
    /// Does not modify the bucket.
    pub fn queued(&self) -> usize {
        let state = self.state.lock();
        let drained = self.drain_count(&state, self.clock.now_millis());
        state.queue.len() - drained
    }

    /// Maximum number of queued requests.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Requests drained per second.
    pub fn processing_rate(&self) -> f64 {
        self.processing_rate
    }

    /// Whole requests processed since the last drain, bounded by queue length.
    #[inline(always)]
    fn drain_count(&self, state: &LeakyBucketState, now: Millis) -> usize {
        let elapsed_ms = now.saturating_sub(state.last_processed_ms);
        let exact = elapsed_ms as f64 * self.processing_rate / 1000.0;
        // Whole results can round to just below the integer (11_250ms at 5.6/s
        // gives 62.99999999999999). `as` saturates for out-of-range floats.
        let processed = (exact + exact * DRAIN_EPSILON).floor() as usize;
        processed.min(state.queue.len())
    }
}

impl<C: Clock> RateLimiter for LeakyBucket<C> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        self.try_consume()
    }

    fn algorithm(&self) -> &'static str {
        "leaky_bucket"
    }
}

/// Configuration structure for creating a [`LeakyBucket`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LeakyBucketConfig {
    /// Maximum number of queued requests.
    pub capacity: u64,
    /// Requests drained per second.
    pub processing_rate: f64,
}

impl LeakyBucketConfig {
    /// Creates a new configuration instance.
    pub fn new(capacity: u64, processing_rate: f64) -> Self {
        Self {
            capacity,
            processing_rate,
        }
    }
}

impl TryFrom<LeakyBucketConfig> for LeakyBucket {
    type Error = RateLimitError;

    fn try_from(config: LeakyBucketConfig) -> Result<Self> {
        LeakyBucket::new(config.capacity, config.processing_rate)
    }
}
