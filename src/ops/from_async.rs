//! FromAsync - adapt a callback-based function into a single-shot stream.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::{ready, Stream};

/// The callback half handed to a function adapted by [`from_async`].
///
/// Calling [`complete`](Completion::complete) delivers the value to the
/// stream. Dropping it without completing ends the stream empty.
pub struct Completion<T> {
    tx: oneshot::Sender<T>,
}

impl<T> Completion<T> {
    /// Deliver the result.
    pub fn complete(self, value: T) {
        // The stream may already be gone; nobody is left to notify.
        let _ = self.tx.send(value);
    }

    /// Whether the stream stopped listening.
    pub fn is_canceled(&self) -> bool {
        self.tx.is_canceled()
    }
}

impl<T> fmt::Debug for Completion<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("canceled", &self.tx.is_canceled())
            .finish()
    }
}

type Start<T> = Box<dyn FnOnce(Completion<T>) + Send>;

/// Single-shot stream created by the factory returned from [`from_async`].
///
/// The wrapped function runs on the first poll, not at construction.
#[must_use = "streams do nothing unless polled"]
pub struct FromAsync<T> {
    start: Option<Start<T>>,
    rx: Option<oneshot::Receiver<T>>,
}

impl<T> FromAsync<T> {
    fn new(start: Start<T>) -> Self {
        FromAsync {
            start: Some(start),
            rx: None,
        }
    }
}

impl<T> fmt::Debug for FromAsync<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromAsync")
            .field("started", &self.start.is_none())
            .field("pending", &self.rx.is_some())
            .finish()
    }
}

impl<T> Stream for FromAsync<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        if let Some(start) = this.start.take() {
            let (tx, rx) = oneshot::channel();
            this.rx = Some(rx);
            start(Completion { tx });
        }
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(None);
        };
        let value = ready!(Pin::new(rx).poll(cx));
        this.rx = None;
        Poll::Ready(value.ok())
    }
}

/// Wrap a function taking arguments plus a completion callback.
///
/// Returns a factory: calling it with the arguments yields a [`FromAsync`]
/// stream that invokes `f` when first polled, emits the value passed to the
/// [`Completion`] and then completes.
///
/// # Example
///
/// ```rust
/// use futures::StreamExt;
/// use rxext::{from_async, Completion};
///
/// fn some_service((name, id): (&'static str, u32), done: Completion<String>) {
///     std::thread::spawn(move || done.complete(format!("{}#{}", name, id)));
/// }
///
/// # tokio_test::block_on(async {
/// let call = from_async(some_service);
/// let out: Vec<String> = call(("jake", 0)).collect().await;
/// assert_eq!(out, vec!["jake#0".to_string()]);
/// # });
/// ```
pub fn from_async<A, T, F>(f: F) -> impl Fn(A) -> FromAsync<T>
where
    F: Fn(A, Completion<T>) + Send + Sync + 'static,
    A: Send + 'static,
    T: Send + 'static,
{
    let f = Arc::new(f);
    move |args: A| {
        let f = Arc::clone(&f);
        FromAsync::new(Box::new(move |done| f(args, done)))
    }
}
