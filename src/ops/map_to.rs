//! MapTo - replace every item with a constant.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`map_to`](super::RxStreamExt::map_to) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct MapTo<St, V> {
        #[pin]
        stream: St,
        value: V,
    }
}

impl<St, V> MapTo<St, V> {
    pub(crate) fn new(stream: St, value: V) -> Self {
        MapTo { stream, value }
    }
}

impl<St, V> Stream for MapTo<St, V>
where
    St: Stream,
    V: Clone,
{
    type Item = V;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<V>> {
        let this = self.project();
        let next = ready!(this.stream.poll_next(cx));
        Poll::Ready(next.map(|_| this.value.clone()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use crate::RxStreamExt;
    use futures::{stream, StreamExt};

    #[test]
    fn test_map_to_unit() {
        let out: Vec<()> = tokio_test::block_on(stream::iter(vec![1]).map_to(()).collect());
        assert_eq!(out, vec![()]);
    }

    #[test]
    fn test_map_to_matches_map() {
        let before: Vec<&str> =
            tokio_test::block_on(stream::iter(1..4).map(|_| "tick").collect());
        let after: Vec<&str> = tokio_test::block_on(stream::iter(1..4).map_to("tick").collect());
        assert_eq!(before, after);
    }
}
