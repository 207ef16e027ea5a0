//! # rxext
//!
//! Reactive conveniences for `futures` streams.
//!
//! The heart of the crate is retrying: a [`RetryPolicy`] decides how long to
//! wait before each resubscription, and a [`Retrying`] stream re-runs a source
//! factory under that policy until it completes, runs out of retries or is
//! cancelled.
//!
//! Around it sit small operators that replace common compositions with one
//! named step - [`unwrap`](RxStreamExt::unwrap), [`pairwise`](RxStreamExt::pairwise),
//! [`ignore`](RxStreamExt::ignore), [`and`](RxStreamExt::and), [`partition`]
//! and friends.
//!
//! ## Quick Example
//!
//! ```rust
//! use futures::StreamExt;
//! use rxext::prelude::*;
//! use rxext::testing::FlakySource;
//!
//! # tokio_test::block_on(async {
//! // Fails once, then emits 1, 2, 3
//! let source = FlakySource::new(1, "connection reset").then_emit(vec![1, 2, 3]);
//!
//! let evens: Vec<i32> = retry(source.factory(), RetryPolicy::immediate(2))
//!     .catch_error_just_complete()
//!     .filter_map_with(|n| if n % 2 == 0 { FilterMap::Map(n) } else { FilterMap::Ignore })
//!     .collect()
//!     .await;
//!
//! assert_eq!(evens, vec![2]);
//! assert_eq!(source.subscriptions(), 2);
//! # });
//! ```
//!
//! Runnable before/after comparisons live in the `demos` directory.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod ops;
pub mod retry;
pub mod testing;

// Re-exports
pub use ops::{from_async, partition, Completion, FilterMap, RxStreamExt};
pub use retry::{
    retry, retry_if, retry_with_hooks, CancelHandle, PolicyError, RetryEvent, RetryPhase,
    RetryPolicy, Retrying,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ops::{from_async, partition, Completion, FilterMap, RxStreamExt};
    pub use crate::retry::{retry, retry_if, retry_with_hooks, RetryPolicy};
}
