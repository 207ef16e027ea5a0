//! Retry policies and resubscribing producers for fallible streams.
//!
//! This module splits retrying into two halves:
//!
//! - **Pure core**: [`RetryPolicy`] is just data - a closed set of four
//!   strategies that compute the delay before each retry
//! - **Imperative shell**: [`Retrying`] is a `Stream` that drives a source
//!   factory, sleeps on the tokio timer between attempts and honours
//!   cancellation
//!
//! # Quick Start
//!
//! ```rust
//! use futures::{stream, StreamExt};
//! use rxext::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let producer = retry(
//!     || stream::iter(vec![Ok::<_, &str>(42)]),
//!     RetryPolicy::delayed(3, Duration::from_millis(10)),
//! );
//!
//! let items: Vec<_> = producer.collect().await;
//! assert_eq!(items, vec![Ok(42)]);
//! # });
//! ```
//!
//! # Retry Strategies
//!
//! - **Immediate**: resubscribe at once
//! - **Delayed**: fixed delay between retries
//! - **CustomTimerDelayed**: delay computed per attempt by a closure
//! - **ExponentialDelayed**: `initial * multiplier^(attempt - 1)`, uncapped
//!
//! # Counting
//!
//! `max_count` bounds the retries, not the attempts: `max_count = 2` means at
//! most three subscriptions (one original, two retries). With `max_count = 0`
//! the first failure is surfaced without consulting the delay.

mod error;
mod policy;
mod producer;

pub use error::PolicyError;
pub use policy::{DelayFn, RetryEvent, RetryPolicy};
pub use producer::{
    retry, retry_if, retry_with_hooks, CancelHandle, RetryPhase, RetryState, Retrying,
};

#[cfg(test)]
mod tests;
