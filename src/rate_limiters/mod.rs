//! Admission-control algorithm implementations.
//!
//! Each limiter is an independent, thread-safe state machine that owns its
//! configuration, its [`Clock`](crate::clock::Clock) and a mutex around its
//! mutable state. None of them depends on another.
//!
//! # Available Algorithms
//!
//! - **[`TokenBucket`]** - Allows bursts up to capacity while maintaining average rate
//! - **[`LeakyBucket`]** - Bounded queue drained at a constant rate
//! - **[`FixedWindowCounter`]** - Simple window-based counting with reset at boundaries
//! - **[`SlidingWindowLog`]** - Exact sliding window from a log of timestamps
//! - **[`SlidingWindowCounter`]** - Constant-memory approximation of the sliding log
//!
//! # Algorithm Comparison
//!
//! | Algorithm | Memory Usage | Accuracy | Burst Handling | Use Case |
//! |-----------|-------------|----------|----------------|----------|
//! | Token Bucket | Low | High | Allow bursts | Bursty traffic |
//! | Leaky Bucket | O(capacity) | High | Queue-bounded | Smooth output rate |
//! | Fixed Window | Low | Medium | Boundary bursts | Simple counting |
//! | Sliding Log | O(max_requests) | Exact | None | Accurate limiting |
//! | Sliding Counter | Low | Good | Good | Efficient approximation |
//!
//! # Thread Safety
//!
//! Every `try_consume` takes the limiter's lock for the whole decision, reads
//! the clock inside it, and releases it before returning. Two callers can never
//! both observe the same free slot.

pub mod token_bucket;
pub use token_bucket::TokenBucket;
pub use token_bucket::TokenBucketConfig;

pub mod leaky_bucket;
pub use leaky_bucket::LeakyBucket;
pub use leaky_bucket::LeakyBucketConfig;

pub mod fixed_window_counter;
pub use fixed_window_counter::FixedWindowCounter;
pub use fixed_window_counter::FixedWindowCounterConfig;

pub mod sliding_window_log;
pub use sliding_window_log::SlidingWindowLog;
pub use sliding_window_log::SlidingWindowLogConfig;

pub mod sliding_window_counter;
pub use sliding_window_counter::SlidingWindowCounter;
pub use sliding_window_counter::SlidingWindowCounterConfig;
