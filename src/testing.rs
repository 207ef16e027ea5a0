//! Testing utilities for retrying producers.
//!
//! [`FlakySource`] is a scripted source factory: it fails a fixed number of
//! subscriptions, then succeeds, and counts every subscription so tests can
//! assert exactly how often a producer resubscribed.
//!
//! # Example
//!
//! ```rust
//! use futures::StreamExt;
//! use rxext::testing::FlakySource;
//! use rxext::{retry, RetryPolicy};
//!
//! # tokio_test::block_on(async {
//! let source = FlakySource::new(1, "transient").then_emit(vec![1, 2]);
//!
//! let items: Vec<_> = retry(source.factory(), RetryPolicy::immediate(2))
//!     .collect()
//!     .await;
//!
//! assert_eq!(items, vec![Ok(1), Ok(2)]);
//! assert_eq!(source.subscriptions(), 2);
//! # });
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures::stream::{self, Iter};

/// The stream type produced by [`FlakySource::factory`].
pub type ScriptedStream<T, E> = Iter<std::vec::IntoIter<Result<T, E>>>;

/// A source factory that fails its first `failures` subscriptions.
///
/// Failing subscriptions emit the optional prefix and then the error.
/// Later subscriptions emit the success values and complete.
#[derive(Debug, Clone)]
pub struct FlakySource<T, E> {
    failures: u32,
    error: E,
    prefix: Vec<T>,
    values: Vec<T>,
    subscriptions: Arc<AtomicU32>,
}

impl<T, E> FlakySource<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Fail the first `failures` subscriptions with `error`.
    pub fn new(failures: u32, error: E) -> Self {
        Self {
            failures,
            error,
            prefix: Vec::new(),
            values: Vec::new(),
            subscriptions: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fail every subscription with `error`.
    pub fn always_failing(error: E) -> Self {
        Self::new(u32::MAX, error)
    }

    /// Emit `prefix` before each failure.
    pub fn emitting_before_failure(mut self, prefix: Vec<T>) -> Self {
        self.prefix = prefix;
        self
    }

    /// Emit `values` once the failures are used up.
    pub fn then_emit(mut self, values: Vec<T>) -> Self {
        self.values = values;
        self
    }

    /// How many times a factory from this source has been called.
    pub fn subscriptions(&self) -> u32 {
        self.subscriptions.load(Ordering::SeqCst)
    }

    /// A factory sharing this source's script and subscription counter.
    pub fn factory(&self) -> impl FnMut() -> ScriptedStream<T, E> + Send + 'static {
        let script = self.clone();
        move || {
            let n = script.subscriptions.fetch_add(1, Ordering::SeqCst);
            let items: Vec<Result<T, E>> = if n < script.failures {
                script
                    .prefix
                    .iter()
                    .cloned()
                    .map(Ok)
                    .chain(std::iter::once(Err(script.error.clone())))
                    .collect()
            } else {
                script.values.iter().cloned().map(Ok).collect()
            };
            stream::iter(items)
        }
    }
}
