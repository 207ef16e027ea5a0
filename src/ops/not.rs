//! Not - negate every item.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`not`](super::RxStreamExt::not) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct Not<St> {
        #[pin]
        stream: St,
    }
}

impl<St> Not<St> {
    pub(crate) fn new(stream: St) -> Self {
        Not { stream }
    }
}

impl<St> Stream for Not<St>
where
    St: Stream,
    St::Item: std::ops::Not,
{
    type Item = <St::Item as std::ops::Not>::Output;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let next = ready!(self.project().stream.poll_next(cx));
        Poll::Ready(next.map(|value| !value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}
