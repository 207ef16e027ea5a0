//! FilterMapWith - filter and map in one synchronous closure.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

/// Result of a [`filter_map_with`](super::RxStreamExt::filter_map_with) closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMap<T> {
    /// Drop the item.
    Ignore,
    /// Emit this value instead of the item.
    Map(T),
}

impl<T> From<Option<T>> for FilterMap<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => FilterMap::Map(v),
            None => FilterMap::Ignore,
        }
    }
}

pin_project! {
    /// Stream for the [`filter_map_with`](super::RxStreamExt::filter_map_with) method.
    #[must_use = "streams do nothing unless polled"]
    pub struct FilterMapWith<St, F> {
        #[pin]
        stream: St,
        f: F,
    }
}

impl<St, F> FilterMapWith<St, F> {
    pub(crate) fn new(stream: St, f: F) -> Self {
        FilterMapWith { stream, f }
    }
}

impl<St: std::fmt::Debug, F> std::fmt::Debug for FilterMapWith<St, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterMapWith")
            .field("stream", &self.stream)
            .field("f", &"<function>")
            .finish()
    }
}

impl<St, F, U> Stream for FilterMapWith<St, F>
where
    St: Stream,
    F: FnMut(St::Item) -> FilterMap<U>,
{
    type Item = U;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<U>> {
        let mut this = self.project();
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(item) => {
                    if let FilterMap::Map(value) = (this.f)(item) {
                        return Poll::Ready(Some(value));
                    }
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
