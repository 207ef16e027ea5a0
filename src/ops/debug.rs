//! DebugTrace - log stream events through `tracing`.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{ready, Stream};
use pin_project_lite::pin_project;

pin_project! {
    /// Stream for the [`debug`](super::RxStreamExt::debug) method.
    #[derive(Debug)]
    #[must_use = "streams do nothing unless polled"]
    pub struct DebugTrace<St> {
        #[pin]
        stream: St,
        label: String,
        subscribed: bool,
        finished: bool,
    }
}

impl<St> DebugTrace<St> {
    pub(crate) fn new(stream: St, label: String) -> Self {
        DebugTrace {
            stream,
            label,
            subscribed: false,
            finished: false,
        }
    }

    /// The label events are logged under.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<St> Stream for DebugTrace<St>
where
    St: Stream,
    St::Item: fmt::Debug,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<St::Item>> {
        let this = self.project();
        if !*this.subscribed {
            *this.subscribed = true;
            tracing::debug!(label = %this.label, "subscribed");
        }
        let next = ready!(this.stream.poll_next(cx));
        match &next {
            Some(item) => tracing::debug!(label = %this.label, ?item, "next"),
            None if !*this.finished => {
                *this.finished = true;
                tracing::debug!(label = %this.label, "completed");
            }
            None => {}
        }
        Poll::Ready(next)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.stream.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use crate::RxStreamExt;
    use futures::{stream, StreamExt};
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_debug_passes_items_through_and_logs() {
        let out: Vec<i32> =
            tokio_test::block_on(stream::iter(vec![1, 2]).debug("numbers").collect());

        assert_eq!(out, vec![1, 2]);
        assert!(logs_contain("subscribed"));
        assert!(logs_contain("item=2"));
        assert!(logs_contain("completed"));
    }

    #[test]
    fn test_debug_keeps_label() {
        let traced = stream::iter(vec![()]).debug("unit");
        assert_eq!(traced.label(), "unit");
    }
}
