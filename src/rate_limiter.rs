//! Core trait for admission-control strategies.
//!
//! Every algorithm in [`crate::rate_limiters`] implements [`RateLimiter`], so a
//! caller can pick one at construction time and hold it behind
//! `Box<dyn RateLimiter>` or `Arc<dyn RateLimiter>` afterwards.

use std::sync::Arc;

/// The capability shared by all rate limiter algorithms.
///
/// Implementations are thread-safe: the whole read-modify-write sequence of a
/// decision runs inside one critical section owned by the instance.
pub trait RateLimiter: Send + Sync {
    /// Decides whether a single request arriving now is admitted.
    ///
    /// Returns `true` and records the admission, or `false` without recording
    /// anything. Time-driven housekeeping (refill, drain, prune) happens in
    /// both cases. Never blocks beyond the internal lock and never fails.
    fn try_consume(&self) -> bool;

    /// Short, stable name of the algorithm, used in log fields.
    fn algorithm(&self) -> &'static str;
}

impl<L: RateLimiter + ?Sized> RateLimiter for Box<L> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        (**self).try_consume()
    }

    fn algorithm(&self) -> &'static str {
        (**self).algorithm()
    }
}

impl<L: RateLimiter + ?Sized> RateLimiter for Arc<L> {
    #[inline(always)]
    fn try_consume(&self) -> bool {
        (**self).try_consume()
    }

    fn algorithm(&self) -> &'static str {
        (**self).algorithm()
    }
}
