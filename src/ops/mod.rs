//! Convenience operators for `futures` streams.
//!
//! Each operator replaces a small composition of standard stream combinators
//! with one named step. The plain-`futures` equivalent is shown per method.
//!
//! ```rust
//! use futures::{stream, StreamExt};
//! use rxext::prelude::*;
//!
//! # tokio_test::block_on(async {
//! // before
//! let before: Vec<i32> = stream::iter(vec![Some(1), None, Some(3)])
//!     .filter_map(|x| async move { x })
//!     .collect()
//!     .await;
//!
//! // after
//! let after: Vec<i32> = stream::iter(vec![Some(1), None, Some(3)])
//!     .unwrap()
//!     .collect()
//!     .await;
//!
//! assert_eq!(before, after);
//! # });
//! ```
//!
//! Most users won't need the adapter types directly; they are returned by the
//! methods on [`RxStreamExt`].

mod and;
mod catch_error;
mod count_where;
mod debug;
mod filter_map;
mod from_async;
mod ignore;
mod map_to;
mod not;
mod pairwise;
mod partition;
mod unwrap;

pub use and::And;
pub use catch_error::CatchErrorJustComplete;
pub use count_where::CountWhere;
pub use debug::DebugTrace;
pub use filter_map::{FilterMap, FilterMapWith};
pub use from_async::{from_async, Completion, FromAsync};
pub use ignore::Ignore;
pub use map_to::MapTo;
pub use not::Not;
pub use pairwise::Pairwise;
pub use partition::{partition, Partition};
pub use unwrap::Unwrap;

use futures::Stream;

/// Extension trait adding reactive convenience operators to every `Stream`.
///
/// All operators are synchronous per item and keep the input order.
pub trait RxStreamExt: Stream {
    /// Drop `None` items and unwrap the rest.
    ///
    /// Equivalent to `.filter_map(|x| async move { x })`.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::RxStreamExt;
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<_> = stream::iter(vec![Some(1), Some(2), None, Some(4)])
    ///     .unwrap()
    ///     .collect()
    ///     .await;
    /// assert_eq!(out, vec![1, 2, 4]);
    /// # });
    /// ```
    fn unwrap<T>(self) -> Unwrap<Self>
    where
        Self: Stream<Item = Option<T>> + Sized,
    {
        Unwrap::new(self)
    }

    /// Emit `(previous, current)` for every item after the first.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::RxStreamExt;
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<_> = stream::iter(vec![1, 2, 3]).pairwise().collect().await;
    /// assert_eq!(out, vec![(1, 2), (2, 3)]);
    /// # });
    /// ```
    fn pairwise(self) -> Pairwise<Self>
    where
        Self: Sized,
        Self::Item: Clone,
    {
        Pairwise::new(self)
    }

    /// Drop every item equal to one of `values`.
    ///
    /// Equivalent to `.filter(|x| !values.contains(x))`.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::RxStreamExt;
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<_> = stream::iter(vec![-1, 1, 2, 3]).ignore([-1, 1]).collect().await;
    /// assert_eq!(out, vec![2, 3]);
    /// # });
    /// ```
    fn ignore<I>(self, values: I) -> Ignore<Self>
    where
        Self: Sized,
        Self::Item: PartialEq,
        I: IntoIterator<Item = Self::Item>,
    {
        Ignore::new(self, values.into_iter().collect())
    }

    /// Replace every item with a clone of `value`.
    ///
    /// Equivalent to `.map(move |_| value.clone())`.
    fn map_to<V>(self, value: V) -> MapTo<Self, V>
    where
        Self: Sized,
        V: Clone,
    {
        MapTo::new(self, value)
    }

    /// On completion, emit how many items matched `predicate`.
    ///
    /// Emits exactly once, even for an empty input.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::RxStreamExt;
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<_> = stream::iter(1..=5).count_where(|x| x % 2 == 0).collect().await;
    /// assert_eq!(out, vec![2]);
    /// # });
    /// ```
    fn count_where<P>(self, predicate: P) -> CountWhere<Self, P>
    where
        Self: Sized,
        P: FnMut(&Self::Item) -> bool,
    {
        CountWhere::new(self, predicate)
    }

    /// Negate every item.
    ///
    /// Equivalent to `.map(|b| !b)`.
    fn not(self) -> Not<Self>
    where
        Self: Sized,
        Self::Item: std::ops::Not,
    {
        Not::new(self)
    }

    /// Logical AND over all items, short-circuiting on the first `false`.
    ///
    /// Emits `false` and completes at the first `false`. Otherwise emits
    /// `true` when the input completes. An empty input emits nothing.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::RxStreamExt;
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<_> = stream::iter(vec![true, false, true]).and().collect().await;
    /// assert_eq!(out, vec![false]);
    /// # });
    /// ```
    fn and(self) -> And<Self>
    where
        Self: Stream<Item = bool> + Sized,
    {
        And::new(self)
    }

    /// Forward `Ok` values and complete quietly at the first `Err`.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::RxStreamExt;
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<i32> = stream::iter(vec![Ok(1), Err("boom"), Ok(3)])
    ///     .catch_error_just_complete()
    ///     .collect()
    ///     .await;
    /// assert_eq!(out, vec![1]);
    /// # });
    /// ```
    fn catch_error_just_complete<T, E>(self) -> CatchErrorJustComplete<Self>
    where
        Self: Stream<Item = Result<T, E>> + Sized,
    {
        CatchErrorJustComplete::new(self)
    }

    /// Filter and map in one synchronous step.
    ///
    /// ```rust
    /// use futures::{stream, StreamExt};
    /// use rxext::{FilterMap, RxStreamExt};
    ///
    /// # tokio_test::block_on(async {
    /// let out: Vec<_> = stream::iter(1..=6)
    ///     .filter_map_with(|x| if x % 2 == 0 { FilterMap::Map(x + 10) } else { FilterMap::Ignore })
    ///     .collect()
    ///     .await;
    /// assert_eq!(out, vec![12, 14, 16]);
    /// # });
    /// ```
    fn filter_map_with<U, F>(self, f: F) -> FilterMapWith<Self, F>
    where
        Self: Sized,
        F: FnMut(Self::Item) -> FilterMap<U>,
    {
        FilterMapWith::new(self, f)
    }

    /// Log subscription, every item and completion at `DEBUG` under `label`.
    ///
    /// Items pass through unchanged.
    fn debug(self, label: impl Into<String>) -> DebugTrace<Self>
    where
        Self: Sized,
        Self::Item: std::fmt::Debug,
    {
        DebugTrace::new(self, label.into())
    }
}

impl<S: Stream + ?Sized> RxStreamExt for S {}
