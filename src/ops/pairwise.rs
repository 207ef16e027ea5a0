//! Pairwise - emit consecutive pairs.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`pairwise`](super::RxStreamExt::pairwise) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct Pairwise<St: Stream> {
        #[pin]
        stream: St,
        previous: Option<St::Item>,
    }
}

impl<St: Stream> Pairwise<St> {
    pub(crate) fn new(stream: St) -> Self {
        Pairwise {
            stream,
            previous: None,
        }
    }
}

impl<St> Stream for Pairwise<St>
where
    St: Stream,
    St::Item: Clone,
{
    type Item = (St::Item, St::Item);

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(current) => {
                    if let Some(previous) = this.previous.replace(current.clone()) {
                        return Poll::Ready(Some((previous, current)));
                    }
                }
                None => return Poll::Ready(None),
            }
        }
    }
}
