//! Algorithm selection as data.
//!
//! [`RateLimiterConfig`] names one algorithm together with its parameters and
//! builds the matching limiter behind `Box<dyn RateLimiter>`. Validation is the
//! limiters' own, so a config is only known to be valid once it has been built.
//!
//! With the `serde` feature enabled the enum is internally tagged by
//! `algorithm`, which lets a host application keep limiter settings in its own
//! configuration files:
//!
//! ```json
//! { "algorithm": "token_bucket", "capacity": 100, "refill_rate": 10.0 }
//! ```

use tracing::debug;

use crate::clock::{Clock, MonotonicClock};
use crate::error::Result;
use crate::rate_limiter::RateLimiter;
use crate::rate_limiters::{
    FixedWindowCounter, FixedWindowCounterConfig, LeakyBucket, LeakyBucketConfig,
    SlidingWindowCounter, SlidingWindowCounterConfig, SlidingWindowLog, SlidingWindowLogConfig,
    TokenBucket, TokenBucketConfig,
};

/// One of the five algorithms with its parameters.
///
/// # Example
///
/// ```rust
/// use rate_guard_strategies::{RateLimiter, RateLimiterConfig};
/// use rate_guard_strategies::rate_limiters::FixedWindowCounterConfig;
///
/// let config = RateLimiterConfig::from(FixedWindowCounterConfig::new(1000, 2));
/// let limiter = config.build().unwrap();
///
/// assert_eq!(limiter.algorithm(), "fixed_window_counter");
/// assert!(limiter.try_consume());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "algorithm", rename_all = "snake_case")
)]
pub enum RateLimiterConfig {
    TokenBucket(TokenBucketConfig),
    LeakyBucket(LeakyBucketConfig),
    FixedWindowCounter(FixedWindowCounterConfig),
    SlidingWindowLog(SlidingWindowLogConfig),
    SlidingWindowCounter(SlidingWindowCounterConfig),
}

impl RateLimiterConfig {
    /// Builds the configured limiter on the real monotonic clock.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimitError::InvalidConfiguration`](crate::RateLimitError::InvalidConfiguration)
    /// when a parameter is out of range.
    pub fn build(&self) -> Result<Box<dyn RateLimiter>> {
        self.build_with_clock(MonotonicClock::new())
    }

    /// Builds the configured limiter reading time from `clock`.
    pub fn build_with_clock<C: Clock + 'static>(&self, clock: C) -> Result<Box<dyn RateLimiter>> {
        debug!(algorithm = self.algorithm(), "building rate limiter from config");

        let limiter: Box<dyn RateLimiter> = match *self {
            RateLimiterConfig::TokenBucket(c) => {
                Box::new(TokenBucket::with_clock(c.capacity, c.refill_rate, clock)?)
            }
            RateLimiterConfig::LeakyBucket(c) => {
                Box::new(LeakyBucket::with_clock(c.capacity, c.processing_rate, clock)?)
            }
            RateLimiterConfig::FixedWindowCounter(c) => Box::new(FixedWindowCounter::with_clock(
                c.window_size_ms,
                c.max_requests,
                clock,
            )?),
            RateLimiterConfig::SlidingWindowLog(c) => Box::new(SlidingWindowLog::with_clock(
                c.window_size_ms,
                c.max_requests,
                clock,
            )?),
            RateLimiterConfig::SlidingWindowCounter(c) => Box::new(
                SlidingWindowCounter::with_clock(c.window_size_ms, c.max_requests, clock)?,
            ),
        };
        Ok(limiter)
    }

    /// Name of the selected algorithm, matching [`RateLimiter::algorithm`].
    pub fn algorithm(&self) -> &'static str {
        match self {
            RateLimiterConfig::TokenBucket(_) => "token_bucket",
            RateLimiterConfig::LeakyBucket(_) => "leaky_bucket",
            RateLimiterConfig::FixedWindowCounter(_) => "fixed_window_counter",
            RateLimiterConfig::SlidingWindowLog(_) => "sliding_window_log",
            RateLimiterConfig::SlidingWindowCounter(_) => "sliding_window_counter",
        }
    }
}

impl From<TokenBucketConfig> for RateLimiterConfig {
    fn from(config: TokenBucketConfig) -> Self {
        RateLimiterConfig::TokenBucket(config)
    }
}

impl From<LeakyBucketConfig> for RateLimiterConfig {
    fn from(config: LeakyBucketConfig) -> Self {
        RateLimiterConfig::LeakyBucket(config)
    }
}

impl From<FixedWindowCounterConfig> for RateLimiterConfig {
    fn from(config: FixedWindowCounterConfig) -> Self {
        RateLimiterConfig::FixedWindowCounter(config)
    }
}

impl From<SlidingWindowLogConfig> for RateLimiterConfig {
    fn from(config: SlidingWindowLogConfig) -> Self {
        RateLimiterConfig::SlidingWindowLog(config)
    }
}

impl From<SlidingWindowCounterConfig> for RateLimiterConfig {
    fn from(config: SlidingWindowCounterConfig) -> Self {
        RateLimiterConfig::SlidingWindowCounter(config)
    }
}
