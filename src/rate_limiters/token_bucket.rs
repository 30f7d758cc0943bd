use parking_lot::Mutex;
use tracing::{debug, trace};

use crate::clock::{Clock, Millis, MonotonicClock};
use crate::error::{ensure_positive, ensure_positive_rate, RateLimitError, Result};
use crate::rate_limiter::RateLimiter;

/// Token bucket rate limiter.
///
/// The bucket holds up to `capacity` tokens and is refilled continuously at
/// `refill_rate` tokens per second. Each admitted request takes one token; a
/// request arriving while less than one whole token is available is rejected.
/// Idle time lets tokens accumulate up to `capacity`, which is what allows
/// short bursts while the long-run rate stays at `refill_rate`.
///
/// # Algorithm Behavior
///
/// - The bucket starts full with `capacity` tokens
/// - On every call, `elapsed_ms * refill_rate / 1000` tokens are added
///   (fractional tokens are kept) and the total is clamped to `capacity`
/// - If at least one token is available it is removed and the request admitted
/// - Refill happens on rejected calls as well
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::clock::ManualClock;
/// use rate_guard_strategies::rate_limiters::TokenBucket;
///
/// let clock = ManualClock::new(0);
/// // 5 tokens, refilled at 2 tokens per second
/// let bucket = TokenBucket::with_clock(5, 2.0, clock.clone()).unwrap();
///
/// let results: Vec<bool> = (0..7).map(|_| bucket.try_consume()).collect();
/// assert_eq!(results, [true, true, true, true, true, false, false]);
///
/// // Two seconds later 4 tokens have been refilled
/// clock.advance_millis(2000);
/// assert!(bucket.try_consume());
/// ```
#[derive(Debug)]
pub struct TokenBucket<C: Clock = MonotonicClock> {
    /// Maximum number of tokens the bucket can hold
    capacity: u64,
    /// Tokens added per second
    refill_rate: f64,
    clock: C,
    /// Internal state protected by mutex for thread safety
    state: Mutex<TokenBucketState>,
}

/// Internal state of the token bucket
#[derive(Debug, Clone, Copy)]
struct TokenBucketState {
    /// Tokens currently available, always within `0.0..=capacity`
    tokens: f64,
    /// Clock reading of the last refill
    last_refill_ms: Millis,
}

impl TokenBucket {
    /// Creates a token bucket driven by the real monotonic clock.
    ///
    /// # Parameters
    ///
    /// * `capacity` - Maximum number of tokens the bucket can hold
    /// * `refill_rate` - Tokens added per second, may be fractional
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfiguration`] if `capacity` is zero or
    /// `refill_rate` is not a finite number greater than zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rate_guard_strategies::rate_limiters::TokenBucket;
    ///
    /// let bucket = TokenBucket::new(100, 10.0).unwrap();
    /// assert!(bucket.try_consume());
    ///
    /// assert!(TokenBucket::new(0, 10.0).is_err());
    /// ```
    pub fn new(capacity: u64, refill_rate: f64) -> Result<Self> {
        Self::with_clock(capacity, refill_rate, MonotonicClock::new())
    }
}

impl<C: Clock> TokenBucket<C> {
    /// Creates a token bucket that reads time from `clock`.
    ///
    /// The bucket starts full and its refill timer starts at the clock's
    /// current reading.
    pub fn with_clock(capacity: u64, refill_rate: f64, clock: C) -> Result<Self> {
        let capacity = ensure_positive("capacity", capacity)?;
        let refill_rate = ensure_positive_rate("refill_rate", refill_rate)?;
        let now = clock.now_millis();

        debug!(capacity, refill_rate, "token bucket created");

        Ok(TokenBucket {
            capacity,
            refill_rate,
            clock,
            state: Mutex::new(TokenBucketState {
                tokens: capacity as f64, // Bucket starts full
                last_refill_ms: now,
            }),
        })
    }

    /// Attempts to take one token.
    ///
    /// Refills the bucket for the time elapsed since the previous call, then
    /// admits the request if at least one whole token is available.
    ///
    /// # Returns
    ///
    /// * `true` - A token was taken and the request is admitted
    /// * `false` - Fewer than one token available, nothing was taken
    #[inline]
    pub fn try_consume(&self) -> bool {
        let mut state = self.state.lock();
        let now = self.clock.now_millis();

        self.refill(&mut state, now);

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            trace!(tokens = state.tokens, "token bucket admitted request");
            true
        } else {
            trace!(tokens = state.tokens, "token bucket rejected request");
            false
        }
    }

    /// Returns the tokens that would be available right now, including the
    /// refill owed since the last call. Does not modify the bucket.
    pub fn available_tokens(&self) -> f64 {
        let mut snapshot = *self.state.lock();
        self.refill(&mut snapshot, self.clock.now_millis());
        snapshot.tokens
    }

    /// Maximum number of tokens the bucket can hold.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Tokens added per second.
    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Adds the tokens earned since `last_refill_ms`, capped at capacity.
    #[inline(always)]
    fn refill(&self, state: &mut TokenBucketState, now: Millis) {
        // A reading older than the last refill counts as zero elapsed time
        let elapsed_ms = now.saturating_sub(state.last_refill_ms);
        if elapsed_ms == 0 {
            return;
        }

        let refilled = elapsed_ms as f64 * self.refill_rate / 1000.0;
        state.tokens = (state.tokens + refilled).min(self.capacity as f64);
        state.last_refill_ms = now;
    }
}

impl<C: Clock> RateLimiter for TokenBucket<C> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        self.try_consume()
    }

    fn algorithm(&self) -> &'static str {
        "token_bucket"
    }
}

/// Configuration structure for creating a [`TokenBucket`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenBucketConfig {
    /// Maximum number of tokens the bucket can hold.
    pub capacity: u64,
    /// Tokens added per second.
    pub refill_rate: f64,
}

impl TokenBucketConfig {
    /// Creates a new configuration instance.
    pub fn new(capacity: u64, refill_rate: f64) -> Self {
        Self {
            capacity,
            refill_rate,
        }
    }
}

impl TryFrom<TokenBucketConfig> for TokenBucket {
    type Error = RateLimitError;

    /// Validates the config and builds a bucket on the real monotonic clock.
    ///
    /// ```
    /// use rate_guard_strategies::rate_limiters::{TokenBucket, TokenBucketConfig};
    ///
    /// let limiter: TokenBucket = TokenBucket::try_from(TokenBucketConfig::new(100, 5.0)).unwrap();
    /// assert_eq!(limiter.capacity(), 100);
    /// ```
    fn try_from(config: TokenBucketConfig) -> Result<Self> {
        TokenBucket::new(config.capacity, config.refill_rate)
    }
}
