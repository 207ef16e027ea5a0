//! Unwrap - drop `None` items.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`unwrap`](super::RxStreamExt::unwrap) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct Unwrap<St> {
        #[pin]
        stream: St,
    }
}

impl<St> Unwrap<St> {
    pub(crate) fn new(stream: St) -> Self {
        Unwrap { stream }
    }
}

impl<St, T> Stream for Unwrap<St>
where
    St: Stream<Item = Option<T>>,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let mut this = self.project();
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(Some(value)) => return Poll::Ready(Some(value)),
                Some(None) => continue,
                None => return Poll::Ready(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::RxStreamExt;
    use futures::{stream, StreamExt};

    #[test]
    fn test_unwrap_drops_none() {
        let out: Vec<i32> = tokio_test::block_on(
            stream::iter(vec![Some(1), Some(2), None, Some(4), Some(5)])
                .unwrap()
                .collect(),
        );
        assert_eq!(out, vec![1, 2, 4, 5]);
    }

    #[test]
    fn test_unwrap_matches_compact_map() {
        let input = vec![None, Some("a"), None, Some("b")];

        let before: Vec<&str> = tokio_test::block_on(
            stream::iter(input.clone())
                .filter_map(|x| async move { x })
                .collect(),
        );
        let after: Vec<&str> = tokio_test::block_on(stream::iter(input).unwrap().collect());

        assert_eq!(before, after);
    }

    #[test]
    fn test_unwrap_all_none_is_empty() {
        let out: Vec<u8> =
            tokio_test::block_on(stream::iter(vec![None::<u8>, None]).unwrap().collect());
        assert!(out.is_empty());
    }
}
