//! error.rs
//! Construction-time error type shared by every rate limiter.
//!
//! Admission decisions are never errors: `try_consume` answers with a plain
//! `bool`. The only thing that can go wrong is building a limiter from
//! parameters that make no sense.

use thiserror::Error;

/// Error returned when a rate limiter cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateLimitError {
    /// A configuration parameter is zero, negative or not a finite number.
    #[error("invalid configuration: `{parameter}` {reason}")]
    InvalidConfiguration {
        /// Name of the offending parameter, e.g. `"capacity"`.
        parameter: &'static str,
        /// Human readable explanation.
        reason: String,
    },
}

/// Result type for limiter construction.
pub type Result<T> = std::result::Result<T, RateLimitError>;

impl RateLimitError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        RateLimitError::InvalidConfiguration {
            parameter,
            reason: reason.into(),
        }
    }
}

/// Rejects zero for integer parameters such as capacities and window sizes.
pub(crate) fn ensure_positive(parameter: &'static str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(RateLimitError::invalid(parameter, "must be greater than 0"));
    }
    Ok(value)
}

/// Rejects rates that are zero, negative, NaN or infinite.
pub(crate) fn ensure_positive_rate(parameter: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(RateLimitError::invalid(
            parameter,
            format!("must be a finite number, got {}", value),
        ));
    }
    if value <= 0.0 {
        return Err(RateLimitError::invalid(
            parameter,
            format!("must be greater than 0, got {}", value),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_parameter() {
        let err = ensure_positive("capacity", 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: `capacity` must be greater than 0"
        );
    }

    #[test]
    fn rate_validation() {
        assert_eq!(ensure_positive_rate("refill_rate", 2.5), Ok(2.5));
        assert!(ensure_positive_rate("refill_rate", 0.0).is_err());
        assert!(ensure_positive_rate("refill_rate", -1.0).is_err());
        assert!(ensure_positive_rate("refill_rate", f64::NAN).is_err());
        assert!(ensure_positive_rate("refill_rate", f64::INFINITY).is_err());
    }
}
