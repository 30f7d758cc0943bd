//! Thread-safe admission-control strategies.
//!
//! Every limiter in this crate answers one question per incoming request:
//! admit it now, or reject it. Five algorithms are provided, each with its own
//! trade-off between memory, accuracy and burst tolerance. All of them
//! implement [`RateLimiter`] and are safe to share between threads.
//!
//! # Quick Start
//!
//! ```rust
//! use rate_guard_strategies::rate_limiters::TokenBucket;
//!
//! // Capacity 100, refilled at 10 tokens per second
//! let limiter = TokenBucket::new(100, 10.0).unwrap();
//!
//! if limiter.try_consume() {
//!     println!("Request allowed");
//! } else {
//!     println!("Request denied");
//! }
//! ```
//!
//! # Available Rate Limiting Algorithms
//!
//! ## [Token Bucket](rate_limiters::TokenBucket)
//! Allows bursts up to capacity while maintaining average rate:
//! ```rust
//! # use rate_guard_strategies::rate_limiters::TokenBucket;
//! let limiter = TokenBucket::new(100, 10.0).unwrap(); // 10 tokens per second
//! ```
//!
//! ## [Leaky Bucket](rate_limiters::LeakyBucket)
//! A bounded queue drained at a constant rate:
//! ```rust
//! # use rate_guard_strategies::rate_limiters::LeakyBucket;
//! let limiter = LeakyBucket::new(100, 10.0).unwrap(); // drains 10 per second
//! ```
//!
//! ## [Fixed Window Counter](rate_limiters::FixedWindowCounter)
//! Simple time-window based counting:
//! ```rust
//! # use rate_guard_strategies::rate_limiters::FixedWindowCounter;
//! let limiter = FixedWindowCounter::new(60_000, 100).unwrap(); // 100 per minute
//! ```
//!
//! ## [Sliding Window Log](rate_limiters::SlidingWindowLog)
//! Exact sliding window from a log of admission times:
//! ```rust
//! # use rate_guard_strategies::rate_limiters::SlidingWindowLog;
//! let limiter = SlidingWindowLog::new(60_000, 100).unwrap();
//! ```
//!
//! ## [Sliding Window Counter](rate_limiters::SlidingWindowCounter)
//! Memory-efficient approximation using only two windows:
//! ```rust
//! # use rate_guard_strategies::rate_limiters::SlidingWindowCounter;
//! let limiter = SlidingWindowCounter::new(60_000, 100).unwrap(); // ~100 per minute
//! ```
//!
//! # Core Concepts
//!
//! ## Time
//! Limiters never take a timestamp from the caller. Each owns a
//! [`Clock`](clock::Clock) and reads monotonic milliseconds from it inside its
//! critical section. The default is [`MonotonicClock`](clock::MonotonicClock);
//! [`ManualClock`](clock::ManualClock) lets tests move time explicitly:
//!
//! ```rust
//! use rate_guard_strategies::clock::ManualClock;
//! use rate_guard_strategies::rate_limiters::FixedWindowCounter;
//!
//! let clock = ManualClock::new(0);
//! let limiter = FixedWindowCounter::with_clock(1000, 1, clock.clone()).unwrap();
//!
//! assert!(limiter.try_consume());
//! assert!(!limiter.try_consume());
//! clock.advance_millis(1000);
//! assert!(limiter.try_consume());
//! ```
//!
//! ## Error Handling
//! Construction returns [`Result`]; zero capacities, zero windows and
//! non-positive or non-finite rates yield
//! [`RateLimitError::InvalidConfiguration`]. After that, `try_consume` cannot
//! fail: a rejection is an ordinary `false` for the caller to act on.
//!
//! ## Thread Safety
//! Each limiter guards its whole decision with its own mutex. Share one
//! instance per guarded resource through an [`Arc`](std::sync::Arc).
//!
//! ## Logging
//! Limiters emit [`tracing`] events: `debug` on construction, `trace` for
//! every decision. No subscriber is installed by this crate.
//!
//! # Algorithm Selection Guide
//!
//! - **Allow controlled bursts**: Use [`TokenBucket`](rate_limiters::TokenBucket)
//! - **Strict constant rate**: Use [`LeakyBucket`](rate_limiters::LeakyBucket)
//! - **Simple implementation**: Use [`FixedWindowCounter`](rate_limiters::FixedWindowCounter)
//! - **Exact sliding window**: Use [`SlidingWindowLog`](rate_limiters::SlidingWindowLog)
//! - **Memory-efficient sliding**: Use [`SlidingWindowCounter`](rate_limiters::SlidingWindowCounter)

pub mod clock;
pub mod config;
pub mod error;
pub mod rate_limiter;
pub mod rate_limiters;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::RateLimiterConfig;
pub use error::{RateLimitError, Result};
pub use rate_limiter::RateLimiter;
