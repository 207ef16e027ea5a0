//! A stream that resubscribes to a failing source according to a [`RetryPolicy`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::FusedStream;
use futures::task::AtomicWaker;
use futures::{ready, Stream, TryStream};
use tokio::runtime::Handle;
use tokio::time::{Instant, Sleep};

use super::policy::{RetryEvent, RetryPolicy};

type RetryPredicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;
type RetryHook<E> = Box<dyn Fn(&RetryEvent<'_, E>) + Send + Sync>;

/// Where a [`Retrying`] producer is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryPhase {
    /// An attempt is active (or about to start on the next poll).
    Running,
    /// The last attempt failed and the producer waits before resubscribing.
    Waiting,
    /// The source completed without error.
    Completed,
    /// A failure was surfaced to the consumer.
    Failed,
    /// The consumer withdrew interest.
    Cancelled,
}

impl RetryPhase {
    /// Whether no further transitions can occur.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RetryPhase::Completed | RetryPhase::Failed | RetryPhase::Cancelled
        )
    }
}

/// Bookkeeping shared by all attempts of one producer.
#[derive(Debug)]
pub struct RetryState<E> {
    attempts_made: u32,
    last_error: Option<E>,
}

impl<E> RetryState<E> {
    fn new() -> Self {
        Self {
            attempts_made: 0,
            last_error: None,
        }
    }

    /// Number of resubscriptions performed so far.
    pub fn attempts_made(&self) -> u32 {
        self.attempts_made
    }

    /// The most recent failure that was retried.
    ///
    /// A terminal failure is handed to the consumer and is not kept here.
    pub fn last_error(&self) -> Option<&E> {
        self.last_error.as_ref()
    }
}

#[derive(Debug, Default)]
struct CancelSignal {
    cancelled: AtomicBool,
    waker: AtomicWaker,
}

/// Cancels a [`Retrying`] producer from anywhere, including another task.
///
/// Once cancelled, the producer never arms another timer nor calls its
/// factory again, even if a timer was already pending.
#[derive(Debug, Clone)]
pub struct CancelHandle(Arc<CancelSignal>);

impl CancelHandle {
    /// Request cancellation and wake the producer's task.
    pub fn cancel(&self) {
        self.0.cancelled.store(true, Ordering::SeqCst);
        self.0.waker.wake();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.cancelled.load(Ordering::SeqCst)
    }
}

enum Attempt<S> {
    Idle,
    Running(Pin<Box<S>>),
    /// `None` is a zero-delay retry that has already yielded once.
    Waiting(Option<Pin<Box<Sleep>>>),
    Done(RetryPhase),
}

/// A stream that re-runs a source factory until it completes, exhausts the
/// policy or is cancelled.
///
/// Values of each attempt are forwarded as `Ok`. The first `Err` ends an
/// attempt; the error is either retried or yielded unchanged as the last item.
/// Attempts never overlap: the failed stream is dropped before the next one
/// is created.
///
/// Dropping the producer cancels it. Delays use `tokio::time`, so a producer
/// with a non-zero delay must be polled inside a tokio runtime. Outside one,
/// the failure that would have been retried is surfaced instead and the
/// producer ends as [`RetryPhase::Failed`]. Immediate retries need no runtime.
///
/// Created by [`retry`], [`retry_if`] and [`retry_with_hooks`].
pub struct Retrying<F, S: TryStream> {
    factory: F,
    policy: RetryPolicy,
    state: RetryState<S::Error>,
    attempt: Attempt<S>,
    should_retry: Option<RetryPredicate<S::Error>>,
    on_retry: Option<RetryHook<S::Error>>,
    signal: Arc<CancelSignal>,
    started: Option<Instant>,
}

/// Resubscribe to the stream produced by `factory` whenever it fails.
///
/// The factory is called lazily on the first poll, then once per retry.
///
/// # Example
///
/// ```rust
/// use futures::{stream, StreamExt};
/// use rxext::{retry, RetryPolicy};
///
/// # tokio_test::block_on(async {
/// let mut calls = 0;
/// let producer = retry(
///     move || {
///         calls += 1;
///         if calls == 1 {
///             stream::iter(vec![Err("flaky")])
///         } else {
///             stream::iter(vec![Ok(1), Ok(2)])
///         }
///     },
///     RetryPolicy::immediate(2),
/// );
///
/// let items: Vec<Result<i32, &str>> = producer.collect().await;
/// assert_eq!(items, vec![Ok(1), Ok(2)]);
/// # });
/// ```
pub fn retry<F, S>(factory: F, policy: RetryPolicy) -> Retrying<F, S>
where
    F: FnMut() -> S,
    S: TryStream,
{
    Retrying::new(factory, policy)
}

/// Retry only errors accepted by `should_retry`.
///
/// A rejected error is surfaced immediately, whatever the remaining budget.
pub fn retry_if<F, S, P>(factory: F, policy: RetryPolicy, should_retry: P) -> Retrying<F, S>
where
    F: FnMut() -> S,
    S: TryStream,
    P: Fn(&S::Error) -> bool + Send + Sync + 'static,
{
    let mut producer = Retrying::new(factory, policy);
    producer.should_retry = Some(Box::new(should_retry));
    producer
}

/// Retry with a hook invoked after every failed attempt.
///
/// The hook runs synchronously before the producer acts on its decision and
/// should not block. It also runs for the terminal failure, with
/// `next_delay == None`.
pub fn retry_with_hooks<F, S, H>(factory: F, policy: RetryPolicy, on_retry: H) -> Retrying<F, S>
where
    F: FnMut() -> S,
    S: TryStream,
    H: Fn(&RetryEvent<'_, S::Error>) + Send + Sync + 'static,
{
    let mut producer = Retrying::new(factory, policy);
    producer.on_retry = Some(Box::new(on_retry));
    producer
}

enum Decision<E> {
    Wait,
    Surface(E),
}

impl<F, S> Retrying<F, S>
where
    F: FnMut() -> S,
    S: TryStream,
{
    /// Create a producer with no retry predicate and no hook.
    pub fn new(factory: F, policy: RetryPolicy) -> Self {
        Retrying {
            factory,
            policy,
            state: RetryState::new(),
            attempt: Attempt::Idle,
            should_retry: None,
            on_retry: None,
            signal: Arc::new(CancelSignal::default()),
            started: None,
        }
    }

    fn subscribe(&mut self) {
        self.attempt = Attempt::Running(Box::pin((self.factory)()));
    }

    fn on_failure(&mut self, error: S::Error) -> Decision<S::Error> {
        let attempts_made = self.state.attempts_made;
        let retryable = self.should_retry.as_ref().is_none_or(|p| p(&error));
        let next_delay = if retryable && !self.policy.is_exhausted(attempts_made) {
            Some(self.policy.next_delay(attempts_made.saturating_add(1)))
        } else {
            None
        };
        // A timer needs a runtime; without one the failure is final.
        let next_delay = match next_delay {
            Some(delay) if !delay.is_zero() && Handle::try_current().is_err() => {
                tracing::error!(
                    retry = attempts_made.saturating_add(1),
                    ?delay,
                    "no tokio runtime to arm the retry timer, giving up"
                );
                None
            }
            other => other,
        };

        if let Some(hook) = &self.on_retry {
            let event = RetryEvent {
                attempt: attempts_made.saturating_add(1),
                error: &error,
                next_delay,
                elapsed: self.started.map_or(Duration::ZERO, |s| s.elapsed()),
            };
            hook(&event);
        }

        match next_delay {
            Some(delay) => {
                tracing::debug!(
                    retry = attempts_made.saturating_add(1),
                    max_count = self.policy.max_count(),
                    ?delay,
                    "source failed, scheduling resubscription"
                );
                self.state.last_error = Some(error);
                self.attempt = if delay.is_zero() {
                    Attempt::Waiting(None)
                } else {
                    Attempt::Waiting(Some(Box::pin(tokio::time::sleep(delay))))
                };
                Decision::Wait
            }
            None => {
                tracing::warn!(
                    attempts = attempts_made.saturating_add(1),
                    retryable,
                    "source failed, giving up"
                );
                self.attempt = Attempt::Done(RetryPhase::Failed);
                Decision::Surface(error)
            }
        }
    }
}

impl<F, S: TryStream> Retrying<F, S> {
    /// Current lifecycle phase.
    pub fn phase(&self) -> RetryPhase {
        match &self.attempt {
            Attempt::Done(phase) => *phase,
            _ if self.signal.cancelled.load(Ordering::SeqCst) => RetryPhase::Cancelled,
            Attempt::Idle | Attempt::Running(_) => RetryPhase::Running,
            Attempt::Waiting(_) => RetryPhase::Waiting,
        }
    }

    /// The policy driving this producer.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Retry bookkeeping for this producer.
    pub fn state(&self) -> &RetryState<S::Error> {
        &self.state
    }

    /// Number of resubscriptions performed so far.
    pub fn attempts_made(&self) -> u32 {
        self.state.attempts_made
    }

    /// The most recent failure that was retried.
    pub fn last_error(&self) -> Option<&S::Error> {
        self.state.last_error()
    }

    /// A handle that cancels this producer from elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(self.signal.clone())
    }

    /// Cancel now: drop any pending timer and the active attempt.
    ///
    /// Has no effect once the producer completed or failed.
    pub fn cancel(&mut self) {
        self.signal.cancelled.store(true, Ordering::SeqCst);
        self.teardown();
    }

    fn teardown(&mut self) {
        if !matches!(self.attempt, Attempt::Done(_)) {
            tracing::debug!(
                attempts_made = self.state.attempts_made,
                "retrying producer cancelled"
            );
            self.attempt = Attempt::Done(RetryPhase::Cancelled);
        }
    }
}

// Sources and timers are boxed; nothing else is ever pinned.
impl<F, S: TryStream> Unpin for Retrying<F, S> {}

impl<F, S> Stream for Retrying<F, S>
where
    F: FnMut() -> S,
    S: TryStream,
{
    type Item = Result<S::Ok, S::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        this.signal.waker.register(cx.waker());
        if this.signal.cancelled.load(Ordering::SeqCst) {
            this.teardown();
            return Poll::Ready(None);
        }

        loop {
            match &mut this.attempt {
                Attempt::Idle => {
                    this.started = Some(Instant::now());
                    this.subscribe();
                }
                Attempt::Running(source) => match ready!(source.as_mut().try_poll_next(cx)) {
                    Some(Ok(value)) => return Poll::Ready(Some(Ok(value))),
                    Some(Err(error)) => {
                        // The failed attempt is torn down before anything else happens.
                        this.attempt = Attempt::Done(RetryPhase::Failed);
                        match this.on_failure(error) {
                            Decision::Surface(error) => return Poll::Ready(Some(Err(error))),
                            Decision::Wait if matches!(this.attempt, Attempt::Waiting(None)) => {
                                cx.waker().wake_by_ref();
                                return Poll::Pending;
                            }
                            Decision::Wait => {}
                        }
                    }
                    None => {
                        tracing::debug!(
                            attempts_made = this.state.attempts_made,
                            "source completed"
                        );
                        this.attempt = Attempt::Done(RetryPhase::Completed);
                        return Poll::Ready(None);
                    }
                },
                Attempt::Waiting(timer) => {
                    if let Some(sleep) = timer {
                        ready!(sleep.as_mut().poll(cx));
                    }
                    this.state.attempts_made = this.state.attempts_made.saturating_add(1);
                    tracing::debug!(retry = this.state.attempts_made, "resubscribing");
                    this.subscribe();
                }
                Attempt::Done(_) => return Poll::Ready(None),
            }
        }
    }
}

impl<F, S> FusedStream for Retrying<F, S>
where
    F: FnMut() -> S,
    S: TryStream,
{
    fn is_terminated(&self) -> bool {
        matches!(self.attempt, Attempt::Done(_))
    }
}

impl<F, S: TryStream> fmt::Debug for Retrying<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retrying")
            .field("policy", &self.policy)
            .field("phase", &self.phase())
            .field("attempts_made", &self.state.attempts_made)
            .finish_non_exhaustive()
    }
}
