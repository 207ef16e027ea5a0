//! And - short-circuit logical AND over a stream of booleans.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`and`](super::RxStreamExt::and) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct And<St> {
        #[pin]
        stream: St,
        seen: bool,
        done: bool,
    }
}

impl<St> And<St> {
    pub(crate) fn new(stream: St) -> Self {
        And {
            stream,
            seen: false,
            done: false,
        }
    }
}

impl<St> Stream for And<St>
where
    St: Stream<Item = bool>,
{
    type Item = bool;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<bool>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(true) => *this.seen = true,
                Some(false) => {
                    *this.done = true;
                    return Poll::Ready(Some(false));
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(this.seen.then_some(true));
                }
            }
        }
    }
}
