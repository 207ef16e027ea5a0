//! Retry policy types and configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::error::PolicyError;

/// A caller-supplied delay calculator for [`RetryPolicy::CustomTimerDelayed`].
///
/// Receives the 1-indexed retry attempt and returns how long to wait before it.
/// The function is called exactly once per retry; results are never cached.
#[derive(Clone)]
pub struct DelayFn(Arc<dyn Fn(u32) -> Duration + Send + Sync>);

impl DelayFn {
    /// Wrap a closure as a delay calculator.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        DelayFn(Arc::new(f))
    }

    /// Compute the delay for a retry attempt.
    pub fn call(&self, attempt: u32) -> Duration {
        (self.0)(attempt)
    }
}

impl fmt::Debug for DelayFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DelayFn(<function>)")
    }
}

/// A retry policy describing when a failed source should be resubscribed.
///
/// Policies are pure data - they describe retry behavior but don't execute it.
/// Attempt indices are 1-indexed and count retries only: attempt `1` is the
/// first resubscription after the original subscription failed.
///
/// # Examples
///
/// ```rust
/// use rxext::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::exponential_delayed(2, Duration::from_secs(3), 2.0);
///
/// assert_eq!(policy.max_count(), 2);
/// assert_eq!(policy.next_delay(1), Duration::from_secs(3));
/// assert_eq!(policy.next_delay(2), Duration::from_secs(6));
/// assert_eq!(policy.delay_for_attempt(3), None);
/// ```
#[derive(Debug, Clone)]
pub enum RetryPolicy {
    /// Resubscribe with no delay.
    Immediate {
        /// Maximum number of retries (not counting the original attempt).
        max_count: u32,
    },
    /// Resubscribe after a fixed delay.
    Delayed {
        /// Maximum number of retries (not counting the original attempt).
        max_count: u32,
        /// Delay before every retry.
        delay: Duration,
    },
    /// Resubscribe after a delay computed by the caller.
    CustomTimerDelayed {
        /// Maximum number of retries (not counting the original attempt).
        max_count: u32,
        /// Delay calculator, invoked once per retry.
        delay_fn: DelayFn,
    },
    /// Resubscribe after `initial * multiplier^(attempt - 1)`.
    ///
    /// No jitter and no cap: delays grow without bound.
    ExponentialDelayed {
        /// Maximum number of retries (not counting the original attempt).
        max_count: u32,
        /// Delay before the first retry.
        initial: Duration,
        /// Growth factor applied per retry.
        multiplier: f64,
    },
}

/// Information about a failed attempt, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed, the original subscription is 1).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, or `None` if the failure is terminal.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first subscription.
    pub elapsed: Duration,
}

impl RetryPolicy {
    /// A `max_count` that is never exhausted.
    pub const UNBOUNDED: u32 = u32::MAX;

    /// Retry immediately, up to `max_count` times.
    ///
    /// ```rust
    /// use rxext::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::immediate(2);
    /// assert_eq!(policy.next_delay(1), Duration::ZERO);
    /// ```
    pub fn immediate(max_count: u32) -> Self {
        RetryPolicy::Immediate { max_count }
    }

    /// Retry after a constant delay, up to `max_count` times.
    ///
    /// ```rust
    /// use rxext::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::delayed(2, Duration::from_secs(3));
    /// assert_eq!(policy.next_delay(1), Duration::from_secs(3));
    /// assert_eq!(policy.next_delay(2), Duration::from_secs(3));
    /// ```
    pub fn delayed(max_count: u32, delay: Duration) -> Self {
        RetryPolicy::Delayed { max_count, delay }
    }

    /// Retry after a delay computed by `delay_fn(attempt)`.
    ///
    /// ```rust
    /// use rxext::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::custom_timer_delayed(3, |attempt| {
    ///     Duration::from_millis(100 * u64::from(attempt))
    /// });
    /// assert_eq!(policy.next_delay(2), Duration::from_millis(200));
    /// ```
    pub fn custom_timer_delayed<F>(max_count: u32, delay_fn: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        RetryPolicy::CustomTimerDelayed {
            max_count,
            delay_fn: DelayFn::new(delay_fn),
        }
    }

    /// Retry with exponentially growing delays.
    ///
    /// Delay = initial * multiplier^(attempt - 1)
    ///
    /// ```rust
    /// use rxext::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential_delayed(5, Duration::from_millis(100), 2.0);
    ///
    /// // 100ms, 200ms, 400ms, 800ms, 1600ms
    /// assert_eq!(policy.next_delay(1), Duration::from_millis(100));
    /// assert_eq!(policy.next_delay(3), Duration::from_millis(400));
    /// ```
    pub fn exponential_delayed(max_count: u32, initial: Duration, multiplier: f64) -> Self {
        RetryPolicy::ExponentialDelayed {
            max_count,
            initial,
            multiplier,
        }
    }

    /// Replace the retry bound, keeping the strategy.
    ///
    /// ```rust
    /// use rxext::RetryPolicy;
    ///
    /// let policy = RetryPolicy::immediate(1).with_max_count(RetryPolicy::UNBOUNDED);
    /// assert!(policy.is_unbounded());
    /// ```
    pub fn with_max_count(mut self, n: u32) -> Self {
        match &mut self {
            RetryPolicy::Immediate { max_count }
            | RetryPolicy::Delayed { max_count, .. }
            | RetryPolicy::CustomTimerDelayed { max_count, .. }
            | RetryPolicy::ExponentialDelayed { max_count, .. } => *max_count = n,
        }
        self
    }

    /// Maximum number of retries, not counting the original attempt.
    pub fn max_count(&self) -> u32 {
        match self {
            RetryPolicy::Immediate { max_count }
            | RetryPolicy::Delayed { max_count, .. }
            | RetryPolicy::CustomTimerDelayed { max_count, .. }
            | RetryPolicy::ExponentialDelayed { max_count, .. } => *max_count,
        }
    }

    /// Whether the policy never runs out of retries.
    pub fn is_unbounded(&self) -> bool {
        self.max_count() == Self::UNBOUNDED
    }

    /// Whether `attempts_made` retries have used up the bound.
    pub fn is_exhausted(&self, attempts_made: u32) -> bool {
        !self.is_unbounded() && attempts_made >= self.max_count()
    }

    /// Delay before retry `attempt` (1-indexed).
    ///
    /// Pure for every strategy except `CustomTimerDelayed`, whose calculator is
    /// invoked once per call. The bound is not checked here; see
    /// [`delay_for_attempt`](Self::delay_for_attempt).
    pub fn next_delay(&self, attempt: u32) -> Duration {
        match self {
            RetryPolicy::Immediate { .. } => Duration::ZERO,
            RetryPolicy::Delayed { delay, .. } => *delay,
            RetryPolicy::CustomTimerDelayed { delay_fn, .. } => delay_fn.call(attempt),
            RetryPolicy::ExponentialDelayed {
                initial,
                multiplier,
                ..
            } => exponential(*initial, *multiplier, attempt),
        }
    }

    /// Delay before retry `attempt`, or `None` if that retry is out of bounds.
    ///
    /// ```rust
    /// use rxext::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::delayed(2, Duration::from_secs(1));
    /// assert_eq!(policy.delay_for_attempt(0), None);
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_secs(1)));
    /// assert_eq!(policy.delay_for_attempt(3), None);
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || (!self.is_unbounded() && attempt > self.max_count()) {
            return None;
        }
        Some(self.next_delay(attempt))
    }

    /// Check that the policy parameters are usable.
    ///
    /// Only exponential policies can be malformed: their multiplier must be
    /// finite and strictly positive.
    pub fn validate(&self) -> Result<(), PolicyError> {
        match self {
            RetryPolicy::ExponentialDelayed { multiplier, .. } if !multiplier.is_finite() => {
                Err(PolicyError::NonFiniteMultiplier(*multiplier))
            }
            RetryPolicy::ExponentialDelayed { multiplier, .. } if *multiplier <= 0.0 => {
                Err(PolicyError::NonPositiveMultiplier(*multiplier))
            }
            _ => Ok(()),
        }
    }
}

/// `initial * multiplier^(attempt - 1)`, saturating at `Duration::MAX`.
fn exponential(initial: Duration, multiplier: f64, attempt: u32) -> Duration {
    if attempt <= 1 {
        return initial;
    }
    let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
    let secs = initial.as_secs_f64() * multiplier.powi(exponent);
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
}

#[cfg(test)]
mod policy_tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_immediate_delay() {
        let policy = RetryPolicy::immediate(2);

        assert_eq!(policy.next_delay(1), Duration::ZERO);
        assert_eq!(policy.next_delay(2), Duration::ZERO);
        assert_eq!(policy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_delayed_delay() {
        let policy = RetryPolicy::delayed(2, Duration::from_secs(3));

        assert_eq!(policy.next_delay(1), Duration::from_secs(3));
        assert_eq!(policy.next_delay(2), Duration::from_secs(3));
        assert_eq!(policy.delay_for_attempt(3), None);
    }

    #[test]
    fn test_exponential_delay() {
        let policy = RetryPolicy::exponential_delayed(2, Duration::from_secs(3), 2.0);

        assert_eq!(policy.next_delay(1), Duration::from_secs(3));
        assert_eq!(policy.next_delay(2), Duration::from_secs(6));
    }

    #[test]
    fn test_exponential_is_uncapped() {
        let policy = RetryPolicy::exponential_delayed(20, Duration::from_millis(100), 2.0);

        assert_eq!(policy.next_delay(11), Duration::from_millis(102_400));
    }

    #[test]
    fn test_exponential_saturates_instead_of_panicking() {
        let policy =
            RetryPolicy::exponential_delayed(RetryPolicy::UNBOUNDED, Duration::from_secs(1), 10.0);

        assert_eq!(policy.next_delay(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_custom_timer_called_once_per_evaluation() {
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy::custom_timer_delayed(3, {
            let calls = calls.clone();
            move |attempt| {
                calls.fetch_add(1, Ordering::SeqCst);
                Duration::from_secs(u64::from(attempt))
            }
        });

        assert_eq!(policy.next_delay(1), Duration::from_secs(1));
        assert_eq!(policy.next_delay(3), Duration::from_secs(3));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_delay_for_attempt_zero_is_none() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.delay_for_attempt(0), None);
    }

    #[test]
    fn test_zero_max_count_never_yields_delay() {
        let policy = RetryPolicy::delayed(0, Duration::from_secs(1));

        assert!(policy.is_exhausted(0));
        assert_eq!(policy.delay_for_attempt(1), None);
    }

    #[test]
    fn test_unbounded_is_never_exhausted() {
        let policy = RetryPolicy::immediate(RetryPolicy::UNBOUNDED);

        assert!(!policy.is_exhausted(u32::MAX));
        assert_eq!(policy.delay_for_attempt(u32::MAX), Some(Duration::ZERO));
    }

    #[test]
    fn test_with_max_count_keeps_strategy() {
        let policy = RetryPolicy::delayed(1, Duration::from_secs(2)).with_max_count(5);

        assert_eq!(policy.max_count(), 5);
        assert!(matches!(policy, RetryPolicy::Delayed { delay, .. } if delay == Duration::from_secs(2)));
    }

    #[test]
    fn test_validate_rejects_bad_multipliers() {
        let nan = RetryPolicy::exponential_delayed(1, Duration::from_secs(1), f64::NAN);
        let negative = RetryPolicy::exponential_delayed(1, Duration::from_secs(1), -2.0);
        let ok = RetryPolicy::exponential_delayed(1, Duration::from_secs(1), 1.5);

        assert!(matches!(
            nan.validate(),
            Err(PolicyError::NonFiniteMultiplier(_))
        ));
        assert_eq!(
            negative.validate(),
            Err(PolicyError::NonPositiveMultiplier(-2.0))
        );
        assert_eq!(ok.validate(), Ok(()));
        assert_eq!(RetryPolicy::immediate(0).validate(), Ok(()));
    }

    #[test]
    fn test_policy_is_debug() {
        let policy = RetryPolicy::custom_timer_delayed(1, |_| Duration::ZERO);
        let debug = format!("{:?}", policy);
        assert!(debug.contains("CustomTimerDelayed"));
        assert!(debug.contains("<function>"));
    }
}
