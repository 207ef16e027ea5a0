//! Error types for retry configuration.

use std::fmt;

/// Error returned by [`RetryPolicy::validate`](super::RetryPolicy::validate).
///
/// Policy evaluation itself never fails; this only flags parameters that
/// would make exponential backoff meaningless.
///
/// # Examples
///
/// ```rust
/// use rxext::{PolicyError, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential_delayed(3, Duration::from_secs(1), 0.0);
/// assert_eq!(policy.validate(), Err(PolicyError::NonPositiveMultiplier(0.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// The exponential multiplier is NaN or infinite.
    NonFiniteMultiplier(f64),
    /// The exponential multiplier is zero or negative.
    NonPositiveMultiplier(f64),
}

impl fmt::Display for PolicyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyError::NonFiniteMultiplier(m) => {
                write!(f, "exponential multiplier must be finite, got {}", m)
            }
            PolicyError::NonPositiveMultiplier(m) => {
                write!(f, "exponential multiplier must be positive, got {}", m)
            }
        }
    }
}

impl std::error::Error for PolicyError {}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_policy_error_display() {
        let err = PolicyError::NonPositiveMultiplier(-1.5);
        assert_eq!(
            format!("{}", err),
            "exponential multiplier must be positive, got -1.5"
        );

        let err = PolicyError::NonFiniteMultiplier(f64::INFINITY);
        assert!(format!("{}", err).contains("finite"));
    }

    #[test]
    fn test_policy_error_is_std_error() {
        fn assert_error<E: std::error::Error>(_: &E) {}
        assert_error(&PolicyError::NonFiniteMultiplier(f64::NAN));
    }
}
