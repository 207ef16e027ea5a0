//! Ignore - drop items equal to any of a fixed set of values.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`ignore`](super::RxStreamExt::ignore) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct Ignore<St: Stream> {
        #[pin]
        stream: St,
        values: Vec<St::Item>,
    }
}

impl<St: Stream> Ignore<St> {
    pub(crate) fn new(stream: St, values: Vec<St::Item>) -> Self {
        Ignore { stream, values }
    }
}

impl<St> Stream for Ignore<St>
where
    St: Stream,
    St::Item: PartialEq,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<St::Item>> {
        let mut this = self.project();
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(item) if this.values.contains(&item) => continue,
                other => return Poll::Ready(other),
            }
        }
    }
}
