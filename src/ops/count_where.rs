//! CountWhere - count matching items, emit once on completion.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`count_where`](super::RxStreamExt::count_where) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct CountWhere<St, P> {
        #[pin]
        stream: St,
        predicate: P,
        count: usize,
        done: bool,
    }
}

impl<St, P> CountWhere<St, P> {
    pub(crate) fn new(stream: St, predicate: P) -> Self {
        CountWhere {
            stream,
            predicate,
            count: 0,
            done: false,
        }
    }
}

impl<St, P> Stream for CountWhere<St, P>
where
    St: Stream,
    P: FnMut(&St::Item) -> bool,
{
    type Item = usize;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<usize>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }
        loop {
            match ready!(this.stream.as_mut().poll_next(cx)) {
                Some(item) => {
                    if (this.predicate)(&item) {
                        *this.count += 1;
                    }
                }
                None => {
                    *this.done = true;
                    return Poll::Ready(Some(*this.count));
                }
            }
        }
    }
}
