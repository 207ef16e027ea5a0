//! Partition - split one stream into matching and non-matching halves.

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, Waker};

use futures::Stream;

const MATCHING: usize = 0;
const REST: usize = 1;

struct Shared<St: Stream, P> {
    stream: Pin<Box<St>>,
    predicate: P,
    buffers: [VecDeque<St::Item>; 2],
    wakers: [Option<Waker>; 2],
    closed: [bool; 2],
    done: bool,
}

impl<St: Stream, P> Shared<St, P> {
    fn wake(&mut self, side: usize) {
        if let Some(waker) = self.wakers[side].take() {
            waker.wake();
        }
    }
}

/// One half of a [`partition`].
///
/// Both halves share the upstream stream. Whichever half polls routes items
/// to the other half's buffer when they belong there, so each half can be
/// consumed on its own task.
///
/// Dropping a half discards its buffered items and hands the upstream over to
/// the other half. Items for the dropped half are discarded from then on.
#[must_use = "streams do nothing unless polled"]
pub struct Partition<St: Stream, P> {
    shared: Arc<Mutex<Shared<St, P>>>,
    side: usize,
}

impl<St: Stream, P> Partition<St, P> {
    fn lock(&self) -> MutexGuard<'_, Shared<St, P>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether this is the half receiving items that matched the predicate.
    pub fn is_matching(&self) -> bool {
        self.side == MATCHING
    }
}

impl<St: Stream, P> fmt::Debug for Partition<St, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Partition")
            .field("matching", &self.is_matching())
            .finish_non_exhaustive()
    }
}

impl<St, P> Stream for Partition<St, P>
where
    St: Stream,
    P: FnMut(&St::Item) -> bool,
{
    type Item = St::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<St::Item>> {
        let side = self.side;
        let other = 1 - side;
        let mut shared = self.lock();

        if let Some(item) = shared.buffers[side].pop_front() {
            return Poll::Ready(Some(item));
        }
        if shared.done {
            return Poll::Ready(None);
        }

        loop {
            match shared.stream.as_mut().poll_next(cx) {
                Poll::Pending => {
                    shared.wakers[side] = Some(cx.waker().clone());
                    return Poll::Pending;
                }
                Poll::Ready(None) => {
                    shared.done = true;
                    shared.wake(other);
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(item)) => {
                    let target = if (shared.predicate)(&item) {
                        MATCHING
                    } else {
                        REST
                    };
                    // The upstream now holds our waker; a parked sibling must re-register.
                    shared.wake(other);
                    if target == side {
                        return Poll::Ready(Some(item));
                    }
                    if !shared.closed[target] {
                        shared.buffers[target].push_back(item);
                    }
                }
            }
        }
    }
}

impl<St: Stream, P> Drop for Partition<St, P> {
    fn drop(&mut self) {
        let side = self.side;
        let mut shared = self.lock();
        shared.closed[side] = true;
        shared.buffers[side].clear();
        shared.wakers[side] = None;
        // The upstream may only know our waker.
        shared.wake(1 - side);
    }
}

/// Split `stream` into the items matching `predicate` and the rest.
///
/// Order is preserved within each half. Items routed to a half that is not
/// being polled are buffered until it is.
///
/// ```rust
/// use futures::{stream, StreamExt};
/// use rxext::partition;
///
/// # tokio_test::block_on(async {
/// let (evens, odds) = partition(stream::iter(1..=5), |x| x % 2 == 0);
///
/// assert_eq!(evens.collect::<Vec<_>>().await, vec![2, 4]);
/// assert_eq!(odds.collect::<Vec<_>>().await, vec![1, 3, 5]);
/// # });
/// ```
pub fn partition<St, P>(stream: St, predicate: P) -> (Partition<St, P>, Partition<St, P>)
where
    St: Stream,
    P: FnMut(&St::Item) -> bool,
{
    let shared = Arc::new(Mutex::new(Shared {
        stream: Box::pin(stream),
        predicate,
        buffers: [VecDeque::new(), VecDeque::new()],
        wakers: [None, None],
        closed: [false, false],
        done: false,
    }));
    (
        Partition {
            shared: Arc::clone(&shared),
            side: MATCHING,
        },
        Partition {
            shared,
            side: REST,
        },
    )
}
