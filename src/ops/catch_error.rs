//! CatchErrorJustComplete - turn the first error into completion.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the
    /// [`catch_error_just_complete`](super::RxStreamExt::catch_error_just_complete) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct CatchErrorJustComplete<St> {
        #[pin]
        stream: St,
        done: bool,
    }
}

impl<St> CatchErrorJustComplete<St> {
    pub(crate) fn new(stream: St) -> Self {
        CatchErrorJustComplete {
            stream,
            done: false,
        }
    }
}

impl<St, T, E> Stream for CatchErrorJustComplete<St>
where
    St: Stream<Item = Result<T, E>>,
{
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        match ready!(this.stream.poll_next(cx)) {
            Some(Ok(value)) => Poll::Ready(Some(value)),
            Some(Err(_)) => {
                tracing::trace!("error swallowed, completing");
                *this.done = true;
                Poll::Ready(None)
            }
            None => {
                *this.done = true;
                Poll::Ready(None)
            }
        }
    }
}
